use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use log::{error, info, warn};
use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::store::RecordStore;

use super::context::Context;
use super::envelope::Envelope;
use super::routes;

type Handler<S> = Box<dyn Fn(&Context<'_, S>) -> LedgerResult<Envelope> + Send + Sync>;

/// Routes operation names to handlers and folds every outcome into an
/// [`Envelope`].
///
/// Handlers run on the caller's thread. `dispatch` takes `&self`, so one
/// dispatcher can serve concurrent callers.
pub struct Dispatcher<S> {
    ledger: Ledger<S>,
    handlers: HashMap<String, Handler<S>>,
}

impl<S: RecordStore + 'static> Dispatcher<S> {
    /// A dispatcher with every ledger operation registered.
    pub fn new(ledger: Ledger<S>) -> Self {
        routes::register(Self::empty(ledger))
    }

    /// A dispatcher with no operations. Register them with [`operation`].
    ///
    /// [`operation`]: Dispatcher::operation
    pub fn empty(ledger: Ledger<S>) -> Self {
        Self {
            ledger,
            handlers: HashMap::new(),
        }
    }

    /// Registers (or replaces) the handler for `name`.
    pub fn operation<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&Context<'_, S>) -> LedgerResult<Envelope> + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
        self
    }

    /// Runs `operation` with positional `args`. Never panics and never
    /// returns an error; failures come back as a failure envelope.
    pub fn dispatch(&self, operation: &str, args: Value) -> Envelope {
        let started_at = Instant::now();
        let result = self.try_dispatch(operation, args);
        let elapsed_ms = started_at.elapsed().as_millis();

        match result {
            Ok(envelope) => {
                info!(
                    "event=dispatch module=dispatch status=ok op={} duration_ms={}",
                    operation, elapsed_ms
                );
                envelope
            }
            Err(err) => {
                warn!(
                    "event=dispatch module=dispatch status=error op={} kind={} duration_ms={} error={}",
                    operation,
                    err.kind().as_str(),
                    elapsed_ms,
                    err
                );
                Envelope::failure(&err)
            }
        }
    }

    fn try_dispatch(&self, operation: &str, args: Value) -> LedgerResult<Envelope> {
        let handler = self
            .handlers
            .get(operation)
            .ok_or_else(|| LedgerError::UnsupportedOperation(operation.to_string()))?;
        let ctx = Context::new(operation, args, &self.ledger);

        match panic::catch_unwind(AssertUnwindSafe(|| handler(&ctx))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|message| message.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(
                    "event=dispatch module=dispatch status=panic op={} payload={}",
                    operation,
                    message.replace(['\n', '\r'], " ")
                );
                Err(LedgerError::Persistence(format!(
                    "{} failed unexpectedly: {}",
                    operation, message
                )))
            }
        }
    }

    /// Registered operation names, sorted.
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn supports(&self, operation: &str) -> bool {
        self.handlers.contains_key(operation)
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }
}
