//! Record bodies for every entity the point-of-sale keeps locally.
//!
//! Each body is a plain serde struct with `#[derive(Entity)]`; the record
//! header (id, type, state, timestamps) lives in [`crate::Record`].

mod account;
mod balance_sheet;
mod customer;
mod expense;
mod product;
mod sale;
mod supplier;
mod transaction;

use rust_decimal::Decimal;

pub use account::Account;
pub use balance_sheet::BalanceSheetEntry;
pub use customer::Customer;
pub use expense::Expense;
pub use product::Product;
pub use sale::{PaymentMethod, Sale, SaleItem};
pub use supplier::Supplier;
pub use transaction::Transaction;

/// Entities carrying a caller-maintained balance.
///
/// Balances are never derived from transaction history. Every balance change
/// goes through [`crate::EntityService::adjust_balance`], so a later ledger
/// reconciliation has one seam to hook into.
pub trait Balanced {
    fn balance(&self) -> Decimal;
    fn set_balance(&mut self, balance: Decimal);
}

impl Balanced for Account {
    fn balance(&self) -> Decimal {
        self.balance
    }

    fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

impl Balanced for Supplier {
    fn balance(&self) -> Decimal {
        self.balance
    }

    fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

impl Balanced for Customer {
    fn balance(&self) -> Decimal {
        self.balance
    }

    fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}
