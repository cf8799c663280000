//! InMemoryRecordStore - HashMap-backed record store for tests and ephemeral sessions.

use std::sync::{Arc, RwLock};

use super::collection::Collection;
use super::{RawRecord, RecordStore, Selector, StoreError, StoredRecord};

/// In-memory record store.
///
/// Clone-friendly via Arc: clones share the same rows.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    storage: Arc<RwLock<Collection>>,
}

impl InMemoryRecordStore {
    /// Create a new empty record store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get_raw(&self, id: &str) -> Result<Option<StoredRecord>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.get(id).cloned())
    }

    fn insert_raw(&self, record: RawRecord) -> Result<StoredRecord, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let row = storage.prepare_insert(record)?;
        storage.commit(row.clone());
        Ok(row)
    }

    fn compare_and_swap_raw(
        &self,
        record: RawRecord,
        expected_version: u64,
    ) -> Result<StoredRecord, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let row = storage.prepare_swap(record, expected_version)?;
        storage.commit(row.clone());
        Ok(row)
    }

    fn select_raw(&self, selector: &Selector) -> Result<Vec<StoredRecord>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.select(selector))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.len())
    }
}
