extern crate self as pos_ledger;

mod clock;
mod config;
mod dispatch;
mod error;
mod ledger;
mod logging;
mod record;
mod service;

pub mod connectivity;
pub mod entities;
pub mod query;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use crate::config::{ConfigError, LedgerConfig, LoggingConfig};
pub use connectivity::{Connectivity, ConnectivityPublisher, ConnectivityState};
pub use dispatch::{Context, Dispatcher, Envelope};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use logging::{init_logging, logging_status};
pub use record::{
    BusinessDate, Entity, Record, RecordId, RecordKind, RecordState, Stored, Timestamp,
    Versioned,
};
pub use service::EntityService;

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
pub use dispatch::{router, serve};

// Derive macro shares the trait's name, as serde does
pub use pos_ledger_macros::Entity;
