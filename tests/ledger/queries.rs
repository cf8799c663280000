//! Derived read models over sales and transactions.

use chrono::NaiveDate;
use pos_ledger::entities::PaymentMethod;
use pos_ledger::query::DateWindow;
use pos_ledger::LedgerConfig;
use rust_decimal::Decimal;
use serde_json::json;
use crate::support::{customer_sale, item, ledger_at, ledger_with, record_sale, sale, ts};

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn whole_day() -> DateWindow {
    DateWindow::new(ts("2024-03-01T00:00:00Z"), ts("2024-03-01T23:59:59Z"))
}

#[test]
fn hourly_sales_fill_every_opening_hour() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    record_sale(&fixture, sale("2024-03-01T09:15:00Z", PaymentMethod::Cash, vec![item("p1", 2, 5)]));
    record_sale(&fixture, sale("2024-03-01T09:45:00Z", PaymentMethod::Card, vec![item("p2", 1, 3)]));
    record_sale(&fixture, sale("2024-03-01T14:05:00Z", PaymentMethod::Cash, vec![item("p1", 1, 5)]));

    let buckets = fixture.ledger.queries().hourly_sales(march_first()).unwrap();

    assert_eq!(buckets.len(), 16);
    assert_eq!(buckets.first().unwrap().hour, 7);
    assert_eq!(buckets.last().unwrap().hour, 22);
    for bucket in &buckets {
        match bucket.hour {
            9 => {
                assert_eq!(bucket.total, Decimal::from(13));
                assert_eq!(bucket.sales_count, 2);
            }
            14 => assert_eq!(bucket.total, Decimal::from(5)),
            _ => {
                assert_eq!(bucket.total, Decimal::ZERO);
                assert_eq!(bucket.sales_count, 0);
            }
        }
    }
    assert_eq!(buckets[2].label, "09:00");
}

#[test]
fn hourly_sales_on_an_empty_day_are_all_zero() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    let buckets = fixture.ledger.queries().hourly_sales_today().unwrap();
    assert_eq!(buckets.len(), 16);
    assert!(buckets.iter().all(|bucket| bucket.total == Decimal::ZERO));
}

#[test]
fn hourly_sales_use_local_hours_and_skip_closed_hours() {
    let mut config = LedgerConfig::for_store("store-7");
    config.utc_offset_minutes = 120;
    let fixture = ledger_with(config, "2024-03-01T18:00:00Z");

    // 07:30 local
    record_sale(&fixture, sale("2024-03-01T05:30:00Z", PaymentMethod::Cash, vec![item("p1", 1, 4)]));
    // 23:10 local, after closing
    record_sale(&fixture, sale("2024-03-01T21:10:00Z", PaymentMethod::Cash, vec![item("p1", 1, 9)]));
    // previous local day
    record_sale(&fixture, sale("2024-02-29T21:59:00Z", PaymentMethod::Cash, vec![item("p1", 1, 7)]));

    let buckets = fixture.ledger.queries().hourly_sales(march_first()).unwrap();
    assert_eq!(buckets[0].hour, 7);
    assert_eq!(buckets[0].total, Decimal::from(4));
    let total: Decimal = buckets.iter().map(|bucket| bucket.total).sum();
    assert_eq!(total, Decimal::from(4));
}

#[test]
fn archived_sales_drop_out_of_reports() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    let kept = record_sale(&fixture, sale("2024-03-01T10:00:00Z", PaymentMethod::Cash, vec![item("p1", 1, 5)]));
    let gone = record_sale(&fixture, sale("2024-03-01T10:30:00Z", PaymentMethod::Cash, vec![item("p1", 9, 5)]));
    fixture.ledger.sales().archive(gone.data.id.as_str()).unwrap();

    let queries = fixture.ledger.queries();
    let items = queries.top_selling_items(whole_day(), None).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, Decimal::ONE);

    let buckets = queries.hourly_sales(march_first()).unwrap();
    assert_eq!(buckets[3].total, kept.data.data.total);
}

#[test]
fn top_selling_items_rank_by_total_with_stable_ties() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    record_sale(
        &fixture,
        sale("2024-03-01T09:00:00Z", PaymentMethod::Cash, vec![item("tea", 2, 10), item("milk", 4, 5)]),
    );
    record_sale(&fixture, sale("2024-03-01T10:00:00Z", PaymentMethod::Card, vec![item("bread", 3, 10)]));
    record_sale(&fixture, sale("2024-03-02T10:00:00Z", PaymentMethod::Card, vec![item("tea", 50, 10)]));

    let queries = fixture.ledger.queries();
    let first = queries.top_selling_items(whole_day(), Some(10)).unwrap();
    let ids: Vec<&str> = first.iter().map(|row| row.product_id.as_str()).collect();
    assert_eq!(ids, vec!["bread", "tea", "milk"]);
    assert_eq!(first[1].total, first[2].total);
    assert_eq!(first[2].quantity, Decimal::from(4));

    for _ in 0..5 {
        assert_eq!(queries.top_selling_items(whole_day(), Some(10)).unwrap(), first);
    }

    let top_one = queries.top_selling_items(whole_day(), Some(1)).unwrap();
    assert_eq!(top_one.len(), 1);
    assert_eq!(top_one[0].product_id, "bread");
}

#[test]
fn top_customers_group_sales_by_customer() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    let ama = fixture
        .ledger
        .customers()
        .create(json!({"name": "Ama"}))
        .unwrap();
    let ama_id = ama.data.id.to_string();

    record_sale(&fixture, customer_sale("2024-03-01T09:00:00Z", &ama_id, 20));
    record_sale(&fixture, customer_sale("2024-03-01T11:00:00Z", "walk-in-kofi", 30));
    record_sale(&fixture, customer_sale("2024-03-01T12:00:00Z", &ama_id, 15));
    record_sale(&fixture, sale("2024-03-01T13:00:00Z", PaymentMethod::Cash, vec![item("p", 1, 99)]));

    let customers = fixture.ledger.queries().top_customers(whole_day(), None).unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].customer_id, ama_id);
    assert_eq!(customers[0].name.as_deref(), Some("Ama"));
    assert_eq!(customers[0].sales_count, 2);
    assert_eq!(customers[0].total, Decimal::from(35));
    assert_eq!(customers[1].customer_id, "walk-in-kofi");
    assert_eq!(customers[1].name, None);
}

#[test]
fn reports_tolerate_empty_ranges() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    let queries = fixture.ledger.queries();
    assert!(queries.top_selling_items(whole_day(), None).unwrap().is_empty());
    assert!(queries.top_customers(whole_day(), None).unwrap().is_empty());
    assert!(queries.today_credit_sales().unwrap().is_empty());
    assert!(queries.today_customer_transactions().unwrap().is_empty());

    let inverted = DateWindow::new(ts("2024-03-02T00:00:00Z"), ts("2024-03-01T00:00:00Z"));
    assert!(queries.sale_items_by_product("p1", inverted).unwrap().is_empty());
}

#[test]
fn today_credit_sales_filter_day_and_payment_method() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    let credit = record_sale(&fixture, sale("2024-03-01T09:00:00Z", PaymentMethod::Credit, vec![item("p", 1, 5)]));
    record_sale(&fixture, sale("2024-03-01T10:00:00Z", PaymentMethod::Cash, vec![item("p", 1, 5)]));
    record_sale(&fixture, sale("2024-02-29T10:00:00Z", PaymentMethod::Credit, vec![item("p", 1, 5)]));

    let sales = fixture.ledger.queries().today_credit_sales().unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].data.id, credit.data.id);

    fixture.clock.set(ts("2024-03-02T08:00:00Z"));
    assert!(fixture.ledger.queries().today_credit_sales().unwrap().is_empty());
}

#[test]
fn today_customer_transactions_need_a_customer() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    let transactions = fixture.ledger.transactions();
    let linked = transactions
        .create(json!({
            "description": "Paid off tab",
            "amount": 40,
            "date": "2024-03-01T12:00:00Z",
            "account": "Till 1",
            "customerId": "store-7:ama",
        }))
        .unwrap();
    transactions
        .create(json!({
            "description": "Float",
            "amount": 100,
            "date": "2024-03-01T07:00:00Z",
            "account": "Till 1",
        }))
        .unwrap();
    transactions
        .create(json!({
            "description": "Old tab",
            "amount": 10,
            "date": "2024-02-28T12:00:00Z",
            "account": "Till 1",
            "customerId": "store-7:ama",
        }))
        .unwrap();

    let today = fixture.ledger.queries().today_customer_transactions().unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].data.id, linked.data.id);
}

#[test]
fn sale_items_by_product_keep_sale_context() {
    let fixture = ledger_at("2024-03-01T18:00:00Z");
    let morning = record_sale(
        &fixture,
        sale("2024-03-01T09:00:00Z", PaymentMethod::Cash, vec![item("tea", 2, 10), item("milk", 1, 5)]),
    );
    record_sale(&fixture, sale("2024-03-01T15:00:00Z", PaymentMethod::Card, vec![item("tea", 1, 10)]));
    record_sale(&fixture, sale("2024-03-05T15:00:00Z", PaymentMethod::Card, vec![item("tea", 7, 10)]));

    let lines = fixture
        .ledger
        .queries()
        .sale_items_by_product("tea", whole_day())
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].sale_id, morning.data.id);
    assert_eq!(lines[0].item.quantity, Decimal::from(2));
    assert_eq!(lines[1].date, ts("2024-03-01T15:00:00Z"));

    let wire = serde_json::to_value(&lines[0]).unwrap();
    assert_eq!(wire["productId"], json!("tea"));
    assert_eq!(wire["saleId"], json!(morning.data.id));
}
