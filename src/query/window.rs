//! Date windows in store-local time.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};
use crate::record::Timestamp;

/// Which end of a window a loosely typed date argument stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Inclusive `[start, end]` instant range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// The whole local calendar day `day` at `offset`.
    pub fn day(day: NaiveDate, offset: FixedOffset) -> Self {
        let start = start_of_day(day, offset);
        Self {
            start,
            end: start + Duration::days(1) - Duration::milliseconds(1),
        }
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        at >= self.start && at <= self.end
    }
}

/// The local calendar date of `at`.
pub fn local_date(at: Timestamp, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

fn start_of_day(day: NaiveDate, offset: FixedOffset) -> Timestamp {
    let local_midnight = day.and_time(NaiveTime::MIN);
    let utc = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

/// Reads a date argument as sent by the UI.
///
/// Accepts RFC 3339 instants, bare `YYYY-MM-DD` dates (the start or end of
/// that local day, depending on `bound`) and epoch milliseconds.
pub fn parse_bound(value: &Value, bound: Bound, offset: FixedOffset) -> LedgerResult<Timestamp> {
    match value {
        Value::String(text) => {
            if let Ok(at) = DateTime::parse_from_rfc3339(text) {
                return Ok(at.with_timezone(&Utc));
            }
            let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                LedgerError::InvalidArgument(format!("unrecognized date `{}`", text))
            })?;
            let window = DateWindow::day(day, offset);
            Ok(match bound {
                Bound::Start => window.start,
                Bound::End => window.end,
            })
        }
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .ok_or_else(|| LedgerError::InvalidArgument(format!("unrecognized date {}", number))),
        other => Err(LedgerError::InvalidArgument(format!(
            "expected a date, got {}",
            other
        ))),
    }
}

/// Reads a bare local date, or the local date of an instant.
pub fn parse_day(value: &Value, offset: FixedOffset) -> LedgerResult<NaiveDate> {
    if let Value::String(text) = value {
        if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Ok(day);
        }
    }
    parse_bound(value, Bound::Start, offset).map(|at| local_date(at, offset))
}
