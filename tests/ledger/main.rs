//! pos_ledger integration tests.

mod entities;
mod queries;
mod connectivity;

#[cfg(feature = "http")]
mod http;
