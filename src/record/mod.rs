//! Records - the one shape every persisted entity shares.
//!
//! All entities live in a single heterogeneous collection. Each record carries
//! a header (`id`, `type`, `state`, `storeNo`, timestamps) and a typed body
//! flattened into the same JSON object:
//!
//! ```json
//! {
//!   "id": "store-7:6f1c...",
//!   "type": "account",
//!   "state": "Active",
//!   "storeNo": "store-7",
//!   "createdAt": "2024-03-01T09:00:00Z",
//!   "updatedAt": "2024-03-01T09:00:00Z",
//!   "name": "Till 1",
//!   "balance": 1000
//! }
//! ```
//!
//! The `type` tag partitions the collection into logical tables. Bodies
//! implement [`Entity`], usually through `#[derive(Entity)]`.

mod id;
mod kind;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};

pub use id::RecordId;
pub use kind::{RecordKind, RecordState};

/// Timestamps are always stored in UTC.
pub type Timestamp = DateTime<Utc>;

/// Trait for record bodies stored in the ledger collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Envelope key for a single record (e.g. `"account"`).
    const NAME: &'static str;

    /// Envelope key for a listing (e.g. `"accounts"`).
    const PLURAL: &'static str;

    /// Record kinds this body may be stored under. The first one is the
    /// default when a create request carries no `type`.
    const KINDS: &'static [RecordKind];

    /// Business date used by date-range selectors.
    fn occurred_at(&self) -> Option<Timestamp> {
        None
    }

    /// Whether `kind` belongs to this entity's partition.
    fn accepts(kind: RecordKind) -> bool {
        Self::KINDS.contains(&kind)
    }
}

/// Conversion used by `#[entity(date)]` so the marked field may be optional.
pub trait BusinessDate {
    fn business_date(&self) -> Option<Timestamp>;
}

impl BusinessDate for Timestamp {
    fn business_date(&self) -> Option<Timestamp> {
        Some(*self)
    }
}

impl BusinessDate for Option<Timestamp> {
    fn business_date(&self) -> Option<Timestamp> {
        *self
    }
}

/// A persisted entity: header fields plus the typed body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub state: RecordState,
    pub store_no: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Entity> Record<T> {
    /// Returns whether this record shows up in listings and aggregates.
    pub fn is_active(&self) -> bool {
        self.state == RecordState::Active
    }

    /// Business date of the body, if it has one.
    pub fn occurred_at(&self) -> Option<Timestamp> {
        self.data.occurred_at()
    }
}

/// Header keys a patch may never overwrite.
pub(crate) const PROTECTED_KEYS: &[&str] = &[
    "id",
    "type",
    "state",
    "storeNo",
    "createdAt",
    "updatedAt",
    "revision",
];

/// A record together with its storage revision.
///
/// The revision starts at 1 and grows by one on every write. It is the token
/// for optimistic concurrency checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// A record as read from or written to the store, with its revision.
pub type Stored<E> = Versioned<Record<E>>;

/// Serializes as the inner value with a `revision` key added alongside.
impl<T: Serialize> Serialize for Versioned<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct WithRevision<'a, T> {
            #[serde(flatten)]
            data: &'a T,
            revision: u64,
        }

        WithRevision {
            data: &self.data,
            revision: self.version,
        }
        .serialize(serializer)
    }
}
