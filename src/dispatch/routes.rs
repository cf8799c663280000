//! The operation table.
//!
//! Every entity gets `create<E>`, `getAll<Es>`, `get<E>ById`, `update<E>`
//! and `archive<E>`, named after the entity's `NAME` and `PLURAL`. Reports,
//! remote directory calls and the connectivity query follow.

use serde_json::{json, Value};

use crate::entities::{
    Account, BalanceSheetEntry, Customer, Expense, Product, Sale, Supplier, Transaction,
};
use crate::error::LedgerError;
use crate::query::parse_day;
use crate::record::Entity;
use crate::store::RecordStore;

use super::dispatcher::Dispatcher;
use super::envelope::Envelope;

pub(crate) fn register<S: RecordStore + 'static>(dispatcher: Dispatcher<S>) -> Dispatcher<S> {
    let dispatcher = entity_routes::<S, Account>(dispatcher);
    let dispatcher = entity_routes::<S, Transaction>(dispatcher);
    let dispatcher = entity_routes::<S, Expense>(dispatcher);
    let dispatcher = entity_routes::<S, BalanceSheetEntry>(dispatcher);
    let dispatcher = entity_routes::<S, Sale>(dispatcher);
    let dispatcher = entity_routes::<S, Supplier>(dispatcher);
    let dispatcher = entity_routes::<S, Customer>(dispatcher);
    let dispatcher = entity_routes::<S, Product>(dispatcher);
    remote_routes(report_routes(dispatcher))
}

fn entity_routes<S: RecordStore + 'static, E: Entity>(dispatcher: Dispatcher<S>) -> Dispatcher<S> {
    let singular = pascal_case(E::NAME);
    let plural = pascal_case(E::PLURAL);

    dispatcher
        .operation(&format!("create{}", singular), |ctx| {
            let created = ctx.ledger().service::<E>().create(ctx.arg(0)?)?;
            Envelope::ok(E::NAME, created)
        })
        .operation(&format!("getAll{}", plural), |ctx| {
            let records = ctx.ledger().service::<E>().get_all()?;
            Envelope::ok(E::PLURAL, records)
        })
        .operation(&format!("get{}ById", singular), |ctx| {
            let id: String = ctx.arg(0)?;
            let record = ctx.ledger().service::<E>().get_by_id(&id)?;
            Envelope::ok(E::NAME, record)
        })
        .operation(&format!("update{}", singular), |ctx| {
            // Accepts either `(patch)` or `(id, patch)`.
            let patch = match (ctx.raw_arg(0), ctx.raw_arg(1)) {
                (Some(Value::String(id)), Some(Value::Object(fields))) => {
                    let mut fields = fields.clone();
                    fields.insert("id".into(), Value::String(id.clone()));
                    Value::Object(fields)
                }
                _ => ctx.arg(0)?,
            };
            let updated = ctx.ledger().service::<E>().update(patch)?;
            Envelope::ok(E::NAME, updated)
        })
        .operation(&format!("archive{}", singular), |ctx| {
            let id: String = ctx.arg(0)?;
            let archived = ctx.ledger().service::<E>().archive(&id)?;
            Envelope::ok(E::NAME, archived)
        })
}

fn report_routes<S: RecordStore + 'static>(dispatcher: Dispatcher<S>) -> Dispatcher<S> {
    dispatcher
        .operation("getTopCustomers", |ctx| {
            let window = ctx.window_arg(0)?;
            let customers = ctx
                .ledger()
                .queries()
                .top_customers(window, ctx.optional_arg(2)?)?;
            Envelope::ok("customers", customers)
        })
        .operation("getTopSellingItems", |ctx| {
            let window = ctx.window_arg(0)?;
            let items = ctx
                .ledger()
                .queries()
                .top_selling_items(window, ctx.optional_arg(2)?)?;
            Envelope::ok("items", items)
        })
        .operation("getHourlySalesData", |ctx| {
            let queries = ctx.ledger().queries();
            let buckets = match ctx.raw_arg(0) {
                Some(day) => {
                    queries.hourly_sales(parse_day(day, ctx.ledger().config().offset())?)?
                }
                None => queries.hourly_sales_today()?,
            };
            Envelope::ok("hourlySales", buckets)
        })
        .operation("getTodayCreditSales", |ctx| {
            Envelope::ok("sales", ctx.ledger().queries().today_credit_sales()?)
        })
        .operation("getTodayCustomerTransactions", |ctx| {
            Envelope::ok(
                "transactions",
                ctx.ledger().queries().today_customer_transactions()?,
            )
        })
        .operation("getSaleItemsByProductId", |ctx| {
            let product_id: String = ctx.arg(0)?;
            let window = ctx.window_arg(1)?;
            let lines = ctx
                .ledger()
                .queries()
                .sale_items_by_product(&product_id, window)?;
            Envelope::ok("saleItems", lines)
        })
}

fn remote_routes<S: RecordStore + 'static>(dispatcher: Dispatcher<S>) -> Dispatcher<S> {
    dispatcher
        .operation("getAllWholeSalers", |ctx| {
            Envelope::ok("wholesalers", ctx.ledger().wholesalers()?)
        })
        .operation("signInWorkspace", |ctx| {
            let store_no: String = ctx.arg(0)?;
            if store_no.trim().is_empty() {
                return Err(LedgerError::InvalidArgument(
                    "signInWorkspace requires a store number".into(),
                ));
            }
            Envelope::ok("workspace", ctx.ledger().sign_in_workspace(&store_no)?)
        })
        .operation("getConnectivityStatus", |ctx| {
            let status = ctx.ledger().connectivity().status();
            Envelope::ok(
                "connectivity",
                json!({ "status": status.to_string(), "online": status.is_online() }),
            )
        })
}

fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
