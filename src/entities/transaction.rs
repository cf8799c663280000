use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Entity, Timestamp};

/// Money moving in or out of an account.
///
/// `customer_id` links customer payments and credit charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
#[serde(rename_all = "camelCase")]
#[entity(kind = "transaction")]
pub struct Transaction {
    pub description: String,
    pub amount: Decimal,
    #[entity(date)]
    pub date: Timestamp,
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}
