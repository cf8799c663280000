//! Derived read models.
//!
//! Every report is recomputed from active records on each call. Reports
//! scan with a [`Selector`](crate::store::Selector) pushed down to the
//! store, then aggregate in memory. Empty input gives empty output, never an
//! error. Grouped rankings keep first-encountered order for equal totals,
//! so results are stable across calls over the same data.

mod daily;
mod sales;
mod window;

use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::entities::SaleItem;
use crate::ledger::Ledger;
use crate::record::{RecordId, Timestamp};
use crate::store::RecordStore;

pub use window::{local_date, parse_bound, parse_day, Bound, DateWindow};

/// Read-only reports over a ledger.
pub struct Queries<'a, S> {
    ledger: &'a Ledger<S>,
}

impl<'a, S: RecordStore> Queries<'a, S> {
    pub fn new(ledger: &'a Ledger<S>) -> Self {
        Self { ledger }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingItem {
    pub product_id: String,
    pub name: String,
    pub quantity: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub sales_count: usize,
    pub total: Decimal,
}

/// One hour of the opening window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySales {
    pub hour: u32,
    /// `HH:00`
    pub label: String,
    pub sales_count: usize,
    pub total: Decimal,
}

/// A sale line together with the sale it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSaleLine {
    pub sale_id: RecordId,
    pub date: Timestamp,
    #[serde(flatten)]
    pub item: SaleItem,
}

/// Insertion-ordered grouping with stable ranking.
struct Tally<K, V> {
    keys: HashMap<K, usize>,
    rows: Vec<V>,
}

impl<K: Hash + Eq, V> Tally<K, V> {
    fn new() -> Self {
        Self {
            keys: HashMap::new(),
            rows: Vec::new(),
        }
    }

    fn entry(&mut self, key: K, init: impl FnOnce() -> V) -> &mut V {
        let next = self.rows.len();
        let index = *self.keys.entry(key).or_insert(next);
        if index == next {
            self.rows.push(init());
        }
        &mut self.rows[index]
    }

    /// Rows by `total` descending; equal totals keep insertion order.
    fn ranked(mut self, limit: usize, total: impl Fn(&V) -> Decimal) -> Vec<V> {
        self.rows.sort_by(|a, b| total(b).cmp(&total(a)));
        self.rows.truncate(limit);
        self.rows
    }
}
