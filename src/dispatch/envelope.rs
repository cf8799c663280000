//! The `{success, ...}` wire envelope.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ErrorKind, LedgerError, LedgerResult};

/// Outcome of one dispatched operation.
///
/// Serializes as `{"success": true, "<key>": payload}` or
/// `{"success": false, "error": "<message>"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success { key: String, payload: Value },
    Failure { kind: ErrorKind, error: String },
}

impl Envelope {
    pub fn ok(key: impl Into<String>, payload: impl Serialize) -> LedgerResult<Self> {
        let payload = serde_json::to_value(payload)
            .map_err(|err| LedgerError::Persistence(format!("unserializable result: {}", err)))?;
        Ok(Envelope::Success {
            key: key.into(),
            payload,
        })
    }

    pub fn failure(err: &LedgerError) -> Self {
        Envelope::Failure {
            kind: err.kind(),
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Envelope::Success { payload, .. } => Some(payload),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Failure { error, .. } => Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(self.is_success()));
        match self {
            Envelope::Success { key, payload } => {
                body.insert(key.clone(), payload.clone());
            }
            Envelope::Failure { error, .. } => {
                body.insert("error".into(), Value::String(error.clone()));
            }
        }
        Value::Object(body)
    }
}

impl From<LedgerResult<Envelope>> for Envelope {
    fn from(result: LedgerResult<Envelope>) -> Self {
        result.unwrap_or_else(|err| Envelope::failure(&err))
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
