use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Entity, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
#[serde(rename_all = "camelCase")]
#[entity(kind = "expense")]
pub struct Expense {
    pub description: String,
    pub amount: Decimal,
    #[entity(date)]
    pub date: Timestamp,
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
