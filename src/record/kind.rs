use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator partitioning the single record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Account,
    Transaction,
    Expense,
    Asset,
    Liability,
    Equity,
    Supplier,
    Customer,
    Sale,
    Product,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Account => "account",
            RecordKind::Transaction => "transaction",
            RecordKind::Expense => "expense",
            RecordKind::Asset => "asset",
            RecordKind::Liability => "liability",
            RecordKind::Equity => "equity",
            RecordKind::Supplier => "supplier",
            RecordKind::Customer => "customer",
            RecordKind::Sale => "sale",
            RecordKind::Product => "product",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soft-delete flag. Records are never physically removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordState {
    Active,
    Inactive,
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordState::Active => f.write_str("Active"),
            RecordState::Inactive => f.write_str("Inactive"),
        }
    }
}
