//! The row set shared by the in-memory and file-backed stores.
//!
//! Writes are split in two: `prepare_*` validates against the current rows
//! and builds the new row without touching anything, `commit` installs it.
//! The file-backed store persists between the two.

use std::collections::HashMap;

use super::{RawRecord, Selector, StoreError, StoredRecord};

#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    rows: HashMap<String, StoredRecord>,
    next_seq: u64,
}

impl Collection {
    pub(crate) fn from_rows(rows: Vec<StoredRecord>) -> Self {
        let next_seq = rows.iter().map(|row| row.seq + 1).max().unwrap_or(0);
        let rows = rows.into_iter().map(|row| (row.id.clone(), row)).collect();
        Collection { rows, next_seq }
    }

    #[cfg(test)]
    pub(crate) fn rows_in_order(&self) -> Vec<StoredRecord> {
        let mut rows: Vec<StoredRecord> = self.rows.values().cloned().collect();
        rows.sort_by_key(|row| row.seq);
        rows
    }

    /// Rows in insertion order as they would be after committing `pending`,
    /// borrowed from the collection without changing it.
    pub(crate) fn rows_with<'a>(&'a self, pending: &'a StoredRecord) -> Vec<&'a StoredRecord> {
        let mut rows: Vec<&StoredRecord> = self
            .rows
            .values()
            .filter(|row| row.id != pending.id)
            .collect();
        rows.push(pending);
        rows.sort_by_key(|row| row.seq);
        rows
    }

    pub(crate) fn get(&self, id: &str) -> Option<&StoredRecord> {
        self.rows.get(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn prepare_insert(&self, record: RawRecord) -> Result<StoredRecord, StoreError> {
        if self.rows.contains_key(&record.id) {
            return Err(StoreError::Duplicate { id: record.id });
        }

        Ok(StoredRecord {
            id: record.id,
            kind: record.kind,
            state: record.state,
            occurred_at_ms: record.occurred_at.map(|at| at.timestamp_millis()),
            seq: self.next_seq,
            version: 1,
            bytes: record.bytes,
        })
    }

    pub(crate) fn prepare_swap(
        &self,
        record: RawRecord,
        expected_version: u64,
    ) -> Result<StoredRecord, StoreError> {
        let current = self
            .rows
            .get(&record.id)
            .ok_or_else(|| StoreError::NotFound {
                id: record.id.clone(),
            })?;

        if current.version != expected_version {
            return Err(StoreError::Conflict {
                id: record.id,
                expected: expected_version,
                actual: current.version,
            });
        }

        if current.kind != record.kind {
            return Err(StoreError::Immutable {
                id: record.id,
                field: "type",
            });
        }

        Ok(StoredRecord {
            id: record.id,
            kind: record.kind,
            state: record.state,
            occurred_at_ms: record.occurred_at.map(|at| at.timestamp_millis()),
            seq: current.seq,
            version: current.version + 1,
            bytes: record.bytes,
        })
    }

    pub(crate) fn commit(&mut self, row: StoredRecord) {
        if row.seq >= self.next_seq {
            self.next_seq = row.seq + 1;
        }
        self.rows.insert(row.id.clone(), row);
    }

    pub(crate) fn select(&self, selector: &Selector) -> Vec<StoredRecord> {
        let mut rows: Vec<StoredRecord> = self
            .rows
            .values()
            .filter(|row| selector.matches(row))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.seq);
        rows
    }
}
