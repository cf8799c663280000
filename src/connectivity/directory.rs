//! Remote workspace directory seam.
//!
//! Only the operations listed here ever leave the device. They are reached
//! through the [`WorkspaceDirectory`] trait so a host can plug in whatever
//! client talks to its remote workspace.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wholesaler {
    pub id: String,
    pub name: String,
    pub store_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub store_no: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote could not be reached, or the connection dropped mid-call.
    Unreachable(String),
    /// The remote answered but has no workspace with this store number.
    UnknownWorkspace(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Unreachable(msg) => write!(f, "remote unreachable: {}", msg),
            RemoteError::UnknownWorkspace(store_no) => {
                write!(f, "unknown workspace: {}", store_no)
            }
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<RemoteError> for LedgerError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unreachable(msg) => LedgerError::NetworkUnavailable(msg),
            RemoteError::UnknownWorkspace(store_no) => {
                LedgerError::NotFound(format!("workspace {}", store_no))
            }
        }
    }
}

pub trait WorkspaceDirectory: Send + Sync {
    fn wholesalers(&self) -> Result<Vec<Wholesaler>, RemoteError>;

    fn sign_in(&self, store_no: &str) -> Result<Workspace, RemoteError>;
}

/// Fixed directory contents, useful for embedding and tests.
///
/// `set_reachable(false)` makes every call fail as if the link dropped
/// after the connectivity check passed.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    wholesalers: Vec<Wholesaler>,
    workspaces: HashMap<String, String>,
    unreachable: AtomicBool,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wholesaler(mut self, wholesaler: Wholesaler) -> Self {
        self.wholesalers.push(wholesaler);
        self
    }

    pub fn with_workspace(mut self, store_no: impl Into<String>, name: impl Into<String>) -> Self {
        self.workspaces.insert(store_no.into(), name.into());
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    fn check_link(&self) -> Result<(), RemoteError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RemoteError::Unreachable("connection dropped".into()));
        }
        Ok(())
    }
}

impl WorkspaceDirectory for StaticDirectory {
    fn wholesalers(&self) -> Result<Vec<Wholesaler>, RemoteError> {
        self.check_link()?;
        Ok(self.wholesalers.clone())
    }

    fn sign_in(&self, store_no: &str) -> Result<Workspace, RemoteError> {
        self.check_link()?;
        self.workspaces
            .get(store_no)
            .map(|name| Workspace {
                store_no: store_no.to_string(),
                name: name.clone(),
            })
            .ok_or_else(|| RemoteError::UnknownWorkspace(store_no.to_string()))
    }
}
