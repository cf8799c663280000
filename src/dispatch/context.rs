//! Arguments and ledger access for one dispatched operation.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::query::{parse_bound, Bound, DateWindow};
use crate::record::Timestamp;
use crate::store::RecordStore;

/// What a handler sees: the operation name, its positional arguments and
/// the ledger it runs against.
pub struct Context<'a, S> {
    operation: &'a str,
    args: Vec<Value>,
    ledger: &'a Ledger<S>,
}

impl<'a, S> Context<'a, S> {
    /// `args` is normally a JSON array of positional arguments. `null` means
    /// none and any other value is a single argument.
    pub(crate) fn new(operation: &'a str, args: Value, ledger: &'a Ledger<S>) -> Self {
        let args = match args {
            Value::Array(args) => args,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        Self {
            operation,
            args,
            ledger,
        }
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    pub fn ledger(&self) -> &'a Ledger<S> {
        self.ledger
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The raw argument at `index`, treating `null` as missing.
    pub fn raw_arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index).filter(|value| !value.is_null())
    }

    /// Decodes a required argument.
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> LedgerResult<T> {
        let value = self.raw_arg(index).ok_or_else(|| {
            LedgerError::InvalidArgument(format!(
                "{} expects argument #{}",
                self.operation,
                index + 1
            ))
        })?;
        self.decode(index, value)
    }

    /// Decodes an argument that may be missing or `null`.
    pub fn optional_arg<T: DeserializeOwned>(&self, index: usize) -> LedgerResult<Option<T>> {
        self.raw_arg(index)
            .map(|value| self.decode(index, value))
            .transpose()
    }

    fn decode<T: DeserializeOwned>(&self, index: usize, value: &Value) -> LedgerResult<T> {
        serde_json::from_value(value.clone()).map_err(|err| {
            LedgerError::InvalidArgument(format!(
                "{} argument #{}: {}",
                self.operation,
                index + 1,
                err
            ))
        })
    }
}

impl<'a, S: RecordStore> Context<'a, S> {
    /// A date argument read in the store's local time.
    pub fn date_arg(&self, index: usize, bound: Bound) -> LedgerResult<Timestamp> {
        let value = self.raw_arg(index).ok_or_else(|| {
            LedgerError::InvalidArgument(format!(
                "{} expects a date as argument #{}",
                self.operation,
                index + 1
            ))
        })?;
        parse_bound(value, bound, self.ledger.config().offset())
    }

    /// Two consecutive date arguments starting at `start_index`.
    pub fn window_arg(&self, start_index: usize) -> LedgerResult<DateWindow> {
        Ok(DateWindow::new(
            self.date_arg(start_index, Bound::Start)?,
            self.date_arg(start_index + 1, Bound::End)?,
        ))
    }
}
