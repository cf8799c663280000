//! Error taxonomy shared by services, queries and the dispatcher.

use std::fmt;

use crate::store::StoreError;

/// Stable, machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Persistence,
    Conflict,
    UnsupportedOperation,
    NetworkUnavailable,
    InvalidArgument,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Conflict => "conflict",
            ErrorKind::UnsupportedOperation => "unsupported_operation",
            ErrorKind::NetworkUnavailable => "network_unavailable",
            ErrorKind::InvalidArgument => "invalid_argument",
        }
    }
}

/// Error type for every ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No record with this id (within the addressed entity's partition).
    NotFound(String),
    /// Store I/O or write failure, id collisions included.
    Persistence(String),
    /// Concurrent modification detected on a read-modify-write.
    Conflict { id: String, expected: u64, actual: u64 },
    /// The dispatcher has no route for this operation name.
    UnsupportedOperation(String),
    /// A remote-dependent operation was attempted or interrupted while offline.
    NetworkUnavailable(String),
    /// Arguments or patch contents could not be decoded.
    InvalidArgument(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Persistence(_) => ErrorKind::Persistence,
            LedgerError::Conflict { .. } => ErrorKind::Conflict,
            LedgerError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            LedgerError::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            LedgerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::NotFound(id) => write!(f, "not found: {}", id),
            LedgerError::Persistence(msg) => write!(f, "persistence error: {}", msg),
            LedgerError::Conflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "conflict: {} was modified concurrently (expected revision {}, actual {})",
                id, expected, actual
            ),
            LedgerError::UnsupportedOperation(op) => write!(f, "unsupported operation: {}", op),
            LedgerError::NetworkUnavailable(msg) => write!(f, "network unavailable: {}", msg),
            LedgerError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => LedgerError::NotFound(id),
            StoreError::Conflict {
                id,
                expected,
                actual,
            } => LedgerError::Conflict {
                id,
                expected,
                actual,
            },
            other => LedgerError::Persistence(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
