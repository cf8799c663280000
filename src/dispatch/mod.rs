//! Operation dispatcher - the single boundary between the UI and the ledger.
//!
//! The UI calls `dispatch(opName, args)` and renders the envelope that comes
//! back. Operations are registered on a [`Dispatcher`] by name; the full
//! table lives in `routes`.
//!
//! ```ignore
//! use pos_ledger::{Dispatcher, Ledger, LedgerConfig};
//! use serde_json::json;
//!
//! let (ledger, _network) = Ledger::in_memory(LedgerConfig::for_store("store-7"));
//! let dispatcher = Dispatcher::new(ledger);
//!
//! let envelope = dispatcher.dispatch("createAccount", json!([{ "name": "Till 1", "balance": 1000 }]));
//! assert!(envelope.is_success());
//! ```

mod context;
mod dispatcher;
mod envelope;
mod routes;

pub use context::Context;
pub use dispatcher::Dispatcher;
pub use envelope::Envelope;

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};
