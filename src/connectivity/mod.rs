//! Process-wide online/offline state.
//!
//! The hosting environment owns the single [`ConnectivityPublisher`] and
//! feeds it network-change notifications. Everything else holds a cloned
//! [`ConnectivityState`] reader which can query the flag, subscribe to
//! changes, or gate a remote-dependent operation with
//! [`ConnectivityState::require_online`].
//!
//! Subscribers are delivered through `event_emitter_rs`, which runs each
//! listener on its own thread; delivery is asynchronous with respect to
//! [`ConnectivityPublisher::set`].

mod directory;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use event_emitter_rs::EventEmitter;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

pub use directory::{RemoteError, StaticDirectory, Wholesaler, Workspace, WorkspaceDirectory};

const CHANGED_EVENT: &str = "connectivity_changed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_online(online: bool) -> Self {
        if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Online => write!(f, "online"),
            Connectivity::Offline => write!(f, "offline"),
        }
    }
}

/// Handle returned by [`ConnectivityState::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

struct Shared {
    online: AtomicBool,
    emitter: Mutex<EventEmitter>,
}

impl Shared {
    fn emitter(&self) -> MutexGuard<'_, EventEmitter> {
        self.emitter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates the single writer and a reader for a fresh connectivity flag.
pub fn channel(initial: Connectivity) -> (ConnectivityPublisher, ConnectivityState) {
    let shared = Arc::new(Shared {
        online: AtomicBool::new(initial.is_online()),
        emitter: Mutex::new(EventEmitter::new()),
    });
    (
        ConnectivityPublisher {
            shared: Arc::clone(&shared),
        },
        ConnectivityState { shared },
    )
}

/// The network-state observer's write handle. Not `Clone`.
pub struct ConnectivityPublisher {
    shared: Arc<Shared>,
}

impl ConnectivityPublisher {
    /// Records a network notification. Subscribers hear about actual
    /// transitions only; returns whether the status changed.
    pub fn set(&self, status: Connectivity) -> bool {
        let online = status.is_online();
        let previous = self.shared.online.swap(online, Ordering::SeqCst);
        if previous == online {
            debug!(
                "event=connectivity_unchanged module=connectivity status={}",
                status
            );
            return false;
        }

        info!(
            "event=connectivity_changed module=connectivity status={}",
            status
        );
        self.shared.emitter().emit(CHANGED_EVENT, online);
        true
    }

    pub fn set_online(&self, online: bool) -> bool {
        self.set(Connectivity::from_online(online))
    }

    /// Another reader for the same flag.
    pub fn state(&self) -> ConnectivityState {
        ConnectivityState {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read side of the connectivity flag. Cheap to clone.
#[derive(Clone)]
pub struct ConnectivityState {
    shared: Arc<Shared>,
}

impl ConnectivityState {
    pub fn status(&self) -> Connectivity {
        Connectivity::from_online(self.is_online())
    }

    pub fn is_online(&self) -> bool {
        self.shared.online.load(Ordering::SeqCst)
    }

    /// Registers `listener` for status changes. It receives `true` when the
    /// store goes online and `false` when it goes offline.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        SubscriptionId(self.shared.emitter().on(CHANGED_EVENT, listener))
    }

    pub fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        self.shared.emitter().remove_listener(&id.0).is_some()
    }

    /// Fails fast with `NetworkUnavailable` unless currently online.
    pub fn require_online(&self, operation: &str) -> LedgerResult<()> {
        if self.is_online() {
            return Ok(());
        }
        debug!(
            "event=remote_gate module=connectivity status=rejected operation={}",
            operation
        );
        Err(LedgerError::NetworkUnavailable(format!(
            "{} requires a connection to the remote workspace",
            operation
        )))
    }
}

impl fmt::Debug for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityState")
            .field("status", &self.status())
            .finish()
    }
}
