//! RecordRepository - typed accessor over the raw record store.

use std::marker::PhantomData;

use crate::record::{Entity, Record, Versioned};

use super::{RawRecord, RecordStore, Selector, StoreError, StoredRecord};

/// Typed repository for one entity's partition of the collection.
///
/// Rows whose kind lies outside `E::KINDS` are invisible through this
/// repository, even for point lookups.
pub struct RecordRepository<'a, S, E> {
    store: &'a S,
    _marker: PhantomData<E>,
}

impl<'a, S: RecordStore, E: Entity> RecordRepository<'a, S, E> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Get a record by id, regardless of state.
    pub fn get(&self, id: &str) -> Result<Option<Versioned<Record<E>>>, StoreError> {
        match self.store.get_raw(id)? {
            Some(row) if E::accepts(row.kind) => decode::<E>(&row).map(Some),
            _ => Ok(None),
        }
    }

    /// Insert a new record. Fails if the id already exists.
    pub fn insert(&self, record: &Record<E>) -> Result<Versioned<Record<E>>, StoreError> {
        let row = self.store.insert_raw(encode(record)?)?;
        Ok(Versioned {
            data: record.clone(),
            version: row.version,
        })
    }

    /// Replace a record if it is still at `expected_version`.
    pub fn compare_and_swap(
        &self,
        record: &Record<E>,
        expected_version: u64,
    ) -> Result<Versioned<Record<E>>, StoreError> {
        let row = self
            .store
            .compare_and_swap_raw(encode(record)?, expected_version)?;
        Ok(Versioned {
            data: record.clone(),
            version: row.version,
        })
    }

    /// Records matching the selector within this entity's kinds, in store order.
    pub fn select(&self, selector: &Selector) -> Result<Vec<Versioned<Record<E>>>, StoreError> {
        let selector = selector.restricted_to(E::KINDS);
        if selector.matches_nothing() {
            return Ok(Vec::new());
        }
        self.store
            .select_raw(&selector)?
            .iter()
            .map(decode::<E>)
            .collect()
    }
}

/// Extension trait for typed record access on any RecordStore.
pub trait RecordsExt: RecordStore + Sized {
    fn records<E: Entity>(&self) -> RecordRepository<'_, Self, E> {
        RecordRepository::new(self)
    }
}

impl<S: RecordStore> RecordsExt for S {}

fn encode<E: Entity>(record: &Record<E>) -> Result<RawRecord, StoreError> {
    Ok(RawRecord {
        id: record.id.to_string(),
        kind: record.kind,
        state: record.state,
        occurred_at: record.data.occurred_at(),
        bytes: serde_json::to_vec(record)?,
    })
}

fn decode<E: Entity>(row: &StoredRecord) -> Result<Versioned<Record<E>>, StoreError> {
    let data: Record<E> = serde_json::from_slice(&row.bytes)?;
    Ok(Versioned {
        data,
        version: row.version,
    })
}
