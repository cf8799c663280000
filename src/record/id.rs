use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique record identifier, formatted `<storeNo>:<uuid>`.
///
/// Immutable once assigned. Caller-supplied ids (imports, restores) are kept
/// verbatim, so parsing never rejects a foreign format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh id scoped to `store_no`.
    pub fn generate(store_no: &str) -> Self {
        RecordId(format!("{}:{}", store_no, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store prefix, when the id follows the `<storeNo>:<uuid>` layout.
    pub fn store_no(&self) -> Option<&str> {
        self.0.split_once(':').map(|(store, _)| store)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
