//! The ledger: a record store plus everything operations need around it.

use std::sync::Arc;

use log::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::connectivity::{
    self, Connectivity, ConnectivityPublisher, ConnectivityState, StaticDirectory, Wholesaler,
    Workspace, WorkspaceDirectory,
};
use crate::entities::{
    Account, BalanceSheetEntry, Customer, Expense, Product, Sale, Supplier, Transaction,
};
use crate::error::{LedgerError, LedgerResult};
use crate::query::Queries;
use crate::record::{Entity, Timestamp};
use crate::service::EntityService;
use crate::store::{FileRecordStore, InMemoryRecordStore, RecordStore};

pub struct Ledger<S = InMemoryRecordStore> {
    store: S,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    connectivity: ConnectivityState,
    directory: Arc<dyn WorkspaceDirectory>,
}

impl Ledger<InMemoryRecordStore> {
    /// An empty in-memory ledger and the writer for its connectivity flag.
    pub fn in_memory(config: LedgerConfig) -> (Self, ConnectivityPublisher) {
        let (publisher, connectivity) =
            connectivity::channel(Connectivity::from_online(config.start_online));
        (
            Self::new(InMemoryRecordStore::new(), config, connectivity),
            publisher,
        )
    }
}

impl Ledger<FileRecordStore> {
    /// Opens the snapshot at `config.data_path`.
    pub fn open(config: LedgerConfig) -> LedgerResult<(Self, ConnectivityPublisher)> {
        let path = config.data_path.clone().ok_or_else(|| {
            LedgerError::InvalidArgument("data_path is required for a file-backed ledger".into())
        })?;
        let store = FileRecordStore::open(path)?;
        let (publisher, connectivity) =
            connectivity::channel(Connectivity::from_online(config.start_online));
        Ok((Self::new(store, config, connectivity), publisher))
    }
}

impl<S: RecordStore> Ledger<S> {
    pub fn new(store: S, config: LedgerConfig, connectivity: ConnectivityState) -> Self {
        info!(
            "event=ledger_start module=ledger status=ok store_no={} connectivity={}",
            config.store_no,
            connectivity.status()
        );
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
            connectivity,
            directory: Arc::new(StaticDirectory::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_directory(mut self, directory: Arc<dyn WorkspaceDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn connectivity(&self) -> &ConnectivityState {
        &self.connectivity
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn service<E: Entity>(&self) -> EntityService<'_, S, E> {
        EntityService::new(self)
    }

    pub fn accounts(&self) -> EntityService<'_, S, Account> {
        self.service()
    }

    pub fn transactions(&self) -> EntityService<'_, S, Transaction> {
        self.service()
    }

    pub fn expenses(&self) -> EntityService<'_, S, Expense> {
        self.service()
    }

    pub fn balance_sheet_entries(&self) -> EntityService<'_, S, BalanceSheetEntry> {
        self.service()
    }

    pub fn sales(&self) -> EntityService<'_, S, Sale> {
        self.service()
    }

    pub fn suppliers(&self) -> EntityService<'_, S, Supplier> {
        self.service()
    }

    pub fn customers(&self) -> EntityService<'_, S, Customer> {
        self.service()
    }

    pub fn products(&self) -> EntityService<'_, S, Product> {
        self.service()
    }

    pub fn queries(&self) -> Queries<'_, S> {
        Queries::new(self)
    }

    /// Fetches the wholesaler directory from the remote workspace.
    pub fn wholesalers(&self) -> LedgerResult<Vec<Wholesaler>> {
        self.connectivity.require_online("getAllWholeSalers")?;
        self.directory.wholesalers().map_err(|err| {
            warn!(
                "event=remote_call module=ledger status=error operation=getAllWholeSalers error={}",
                err
            );
            LedgerError::from(err)
        })
    }

    /// Resolves `store_no` against the remote workspace directory.
    pub fn sign_in_workspace(&self, store_no: &str) -> LedgerResult<Workspace> {
        self.connectivity.require_online("signInWorkspace")?;
        let workspace = self.directory.sign_in(store_no).map_err(|err| {
            warn!(
                "event=remote_call module=ledger status=error operation=signInWorkspace error={}",
                err
            );
            LedgerError::from(err)
        })?;
        info!(
            "event=workspace_sign_in module=ledger status=ok store_no={}",
            workspace.store_no
        );
        Ok(workspace)
    }
}
