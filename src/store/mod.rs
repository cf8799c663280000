//! Record store - the persistence substrate behind every entity service.
//!
//! One physical collection holds every record regardless of type. The raw
//! [`RecordStore`] trait deals in serialized rows plus the header columns the
//! store needs to evaluate a [`Selector`] (kind, state, business date).
//! [`RecordsExt`] layers typed access on top.
//!
//! ## Example
//!
//! ```ignore
//! use pos_ledger::{InMemoryRecordStore, RecordsExt, Selector};
//!
//! let store = InMemoryRecordStore::new();
//! let saved = store.records::<Account>().insert(&record)?;
//! let active = store.records::<Account>().select(&Selector::new().active())?;
//! ```

mod collection;
mod file;
mod in_memory;
mod selector;
mod typed;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{RecordKind, RecordState, Timestamp};

pub use file::FileRecordStore;
pub use in_memory::InMemoryRecordStore;
pub use selector::Selector;
pub use typed::{RecordRepository, RecordsExt};

/// A serialized record ready to be written.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub id: String,
    pub kind: RecordKind,
    pub state: RecordState,
    pub occurred_at: Option<Timestamp>,
    pub bytes: Vec<u8>,
}

/// A row as held by the store.
///
/// `seq` is assigned on insert and never changes, so ordering by it yields the
/// store-native (insertion) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub kind: RecordKind,
    pub state: RecordState,
    /// Business date in epoch milliseconds.
    pub occurred_at_ms: Option<i64>,
    pub seq: u64,
    pub version: u64,
    pub bytes: Vec<u8>,
}

/// Error type for record store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency conflict.
    Conflict { id: String, expected: u64, actual: u64 },
    /// Insert collided with an existing id.
    Duplicate { id: String },
    /// No record with this id.
    NotFound { id: String },
    /// A write tried to change an immutable header column.
    Immutable { id: String, field: &'static str },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error (poisoned lock, file I/O).
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "concurrent modification of {} (expected revision {}, actual {})",
                id, expected, actual
            ),
            StoreError::Duplicate { id } => write!(f, "record id already exists: {}", id),
            StoreError::NotFound { id } => write!(f, "record not found: {}", id),
            StoreError::Immutable { id, field } => {
                write!(f, "field {} of record {} is immutable", field, id)
            }
            StoreError::Serde(msg) => write!(f, "record serialization error: {}", msg),
            StoreError::Storage(msg) => write!(f, "record storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Raw storage for the single record collection.
///
/// Every method is atomic with respect to the row it touches. There are no
/// multi-row transactions.
pub trait RecordStore: Send + Sync {
    /// Point lookup by id, regardless of kind or state.
    fn get_raw(&self, id: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Insert a new row. Fails with `Duplicate` if the id exists.
    fn insert_raw(&self, record: RawRecord) -> Result<StoredRecord, StoreError>;

    /// Replace a row if its current revision equals `expected_version`.
    ///
    /// This is the single check-and-swap primitive every read-modify-write in
    /// the crate goes through. The kind of a row can never change.
    fn compare_and_swap_raw(
        &self,
        record: RawRecord,
        expected_version: u64,
    ) -> Result<StoredRecord, StoreError>;

    /// Rows matching the selector, in insertion order.
    fn select_raw(&self, selector: &Selector) -> Result<Vec<StoredRecord>, StoreError>;

    /// Number of rows, archived ones included.
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
