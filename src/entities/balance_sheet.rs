use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Entity;

/// One line of the balance sheet.
///
/// The section (asset, liability or equity) is the record `type`, chosen by
/// the caller on create and fixed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
#[serde(rename_all = "camelCase")]
#[entity(
    kinds = "asset, liability, equity",
    name = "balanceSheetEntry",
    plural = "balanceSheetEntries"
)]
pub struct BalanceSheetEntry {
    pub category: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
