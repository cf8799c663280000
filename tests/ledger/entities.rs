//! Entity service contract, exercised for every entity type.

use pos_ledger::store::InMemoryRecordStore;
use pos_ledger::{Entity, EntityService, ErrorKind, RecordKind, RecordState};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use crate::support::{ledger_at, Fixture};

fn samples() -> Vec<(&'static str, Value)> {
    vec![
        ("account", json!({"name": "Till 1", "balance": 1000})),
        (
            "transaction",
            json!({"description": "Float", "amount": 50, "date": "2024-03-01T08:00:00Z", "account": "Till 1"}),
        ),
        (
            "expense",
            json!({"description": "Rent", "amount": 900, "date": "2024-03-01T08:00:00Z", "account": "Bank", "category": "premises"}),
        ),
        ("asset", json!({"type": "asset", "category": "Stock", "amount": 4000})),
        (
            "sale",
            json!({"date": "2024-03-01T09:30:00Z", "total": 12, "paymentMethod": "cash", "items": []}),
        ),
        ("supplier", json!({"name": "Mills Ltd", "balance": -300})),
        ("customer", json!({"name": "Ama", "creditLimit": 200})),
        ("product", json!({"name": "Bread", "price": 2.5, "sku": "BR-1"})),
    ]
}

fn check_lifecycle<E: Entity>(service: EntityService<'_, InMemoryRecordStore, E>, kind: &str, data: Value) {
    let created = service.create(data).unwrap();
    let id = created.data.id.to_string();

    let fetched = service.get_by_id(&id).unwrap();
    assert_eq!(fetched.data.state, RecordState::Active);
    assert_eq!(fetched.data.kind.as_str(), kind);
    assert!(E::accepts(fetched.data.kind));

    let listed: Vec<String> = service
        .get_all()
        .unwrap()
        .into_iter()
        .map(|record| record.data.id.to_string())
        .collect();
    assert!(listed.contains(&id), "{} missing from getAll", kind);

    let archived = service.archive(&id).unwrap();
    assert_eq!(archived.data.state, RecordState::Inactive);
    let again = service.archive(&id).unwrap();
    assert_eq!(again.data.state, RecordState::Inactive);

    assert!(service
        .get_all()
        .unwrap()
        .iter()
        .all(|record| record.data.id.as_str() != id));
    assert_eq!(service.get_by_id(&id).unwrap().data.state, RecordState::Inactive);
}

#[test]
fn every_entity_follows_the_lifecycle() {
    let Fixture { ledger, .. } = ledger_at("2024-03-01T09:00:00Z");
    let mut samples = samples().into_iter();
    let mut next = || samples.next().unwrap();

    let (kind, data) = next();
    check_lifecycle(ledger.accounts(), kind, data);
    let (kind, data) = next();
    check_lifecycle(ledger.transactions(), kind, data);
    let (kind, data) = next();
    check_lifecycle(ledger.expenses(), kind, data);
    let (kind, data) = next();
    check_lifecycle(ledger.balance_sheet_entries(), kind, data);
    let (kind, data) = next();
    check_lifecycle(ledger.sales(), kind, data);
    let (kind, data) = next();
    check_lifecycle(ledger.suppliers(), kind, data);
    let (kind, data) = next();
    check_lifecycle(ledger.customers(), kind, data);
    let (kind, data) = next();
    check_lifecycle(ledger.products(), kind, data);
}

#[test]
fn type_partitions_the_collection() {
    let Fixture { ledger, .. } = ledger_at("2024-03-01T09:00:00Z");
    let account = ledger
        .accounts()
        .create(json!({"name": "Till 1"}))
        .unwrap();
    ledger
        .suppliers()
        .create(json!({"name": "Mills Ltd"}))
        .unwrap();
    ledger
        .balance_sheet_entries()
        .create(json!({"type": "equity", "category": "Capital", "amount": 100}))
        .unwrap();

    assert_eq!(ledger.accounts().get_all().unwrap().len(), 1);
    assert_eq!(ledger.suppliers().get_all().unwrap().len(), 1);
    assert_eq!(ledger.balance_sheet_entries().get_all().unwrap().len(), 1);
    assert!(ledger.customers().get_all().unwrap().is_empty());

    let err = ledger
        .suppliers()
        .get_by_id(account.data.id.as_str())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn update_never_moves_id_or_type() {
    let Fixture { ledger, clock, .. } = ledger_at("2024-03-01T09:00:00Z");
    let created = ledger
        .balance_sheet_entries()
        .create(json!({"type": "asset", "category": "Stock", "amount": 4000}))
        .unwrap();

    let mut previous = created.data.updated_at;
    for (step, patch) in [
        json!({"type": "liability", "amount": 3500}),
        json!({"id": "store-7:other", "category": "Inventory"}),
        json!({"state": "Inactive", "description": "Shelf count"}),
    ]
    .into_iter()
    .enumerate()
    {
        if step == 1 {
            clock.advance(chrono::Duration::seconds(30));
        }
        let mut patch = patch;
        patch["id"] = json!(created.data.id);
        let updated = ledger.balance_sheet_entries().update(patch).unwrap();

        assert_eq!(updated.data.id, created.data.id);
        assert_eq!(updated.data.kind, RecordKind::Asset);
        assert_eq!(updated.data.state, RecordState::Active);
        assert!(updated.data.updated_at > previous);
        previous = updated.data.updated_at;
    }

    let latest = ledger
        .balance_sheet_entries()
        .get_by_id(created.data.id.as_str())
        .unwrap();
    assert_eq!(latest.data.data.amount, Decimal::from(3500));
    assert_eq!(latest.data.data.category, "Inventory");
    assert_eq!(latest.data.data.description.as_deref(), Some("Shelf count"));
    assert_eq!(latest.version, 4);
}

#[test]
fn till_one_scenario() {
    let Fixture { ledger, .. } = ledger_at("2024-03-01T09:00:00Z");
    let accounts = ledger.accounts();

    let till = accounts
        .create(json!({"name": "Till 1", "balance": 1000}))
        .unwrap();
    let id = till.data.id.to_string();
    assert!(accounts
        .get_all()
        .unwrap()
        .iter()
        .any(|account| account.data.id.as_str() == id));

    accounts.archive(&id).unwrap();
    assert!(accounts
        .get_all()
        .unwrap()
        .iter()
        .all(|account| account.data.id.as_str() != id));

    let archived = accounts.get_by_id(&id).unwrap();
    assert_eq!(archived.data.data.name, "Till 1");
    assert_eq!(archived.data.data.balance, Decimal::from(1000));
    assert_eq!(archived.data.state, RecordState::Inactive);
}

#[test]
fn archiving_does_not_cascade() {
    let Fixture { ledger, .. } = ledger_at("2024-03-01T09:00:00Z");
    let till = ledger
        .accounts()
        .create(json!({"name": "Till 1", "balance": 1000}))
        .unwrap();
    let transaction = ledger
        .transactions()
        .create(json!({
            "description": "Float",
            "amount": 50,
            "date": "2024-03-01T08:00:00Z",
            "account": till.data.id,
        }))
        .unwrap();

    ledger.transactions().archive(transaction.data.id.as_str()).unwrap();
    let till = ledger.accounts().get_by_id(till.data.id.as_str()).unwrap();
    assert_eq!(till.data.data.balance, Decimal::from(1000));
    assert_eq!(till.data.state, RecordState::Active);
    assert_eq!(till.version, 1);
}

#[test]
fn missing_ids_are_not_found() {
    let Fixture { ledger, .. } = ledger_at("2024-03-01T09:00:00Z");
    assert_eq!(
        ledger.products().get_by_id("store-7:nope").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ledger.sales().archive("store-7:nope").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn malformed_payloads_are_invalid_arguments() {
    let Fixture { ledger, .. } = ledger_at("2024-03-01T09:00:00Z");
    let err = ledger.sales().create(json!({"total": 5})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = ledger.accounts().create(json!(["Till 1"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let till = ledger.accounts().create(json!({"name": "Till 1"})).unwrap();
    let err = ledger
        .accounts()
        .update(json!({"id": till.data.id, "balance": "lots"}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(ledger.accounts().get_by_id(till.data.id.as_str()).unwrap().version, 1);
}
