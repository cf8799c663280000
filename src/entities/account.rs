use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Entity;

/// A cash drawer, bank or mobile-money account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
#[serde(rename_all = "camelCase")]
#[entity(kind = "account")]
pub struct Account {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
}
