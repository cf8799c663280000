//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use pos_ledger::store::InMemoryRecordStore;
use pos_ledger::{Dispatcher, Ledger, LedgerConfig};
use serde_json::{json, Value};

fn test_dispatcher() -> Arc<Dispatcher<InMemoryRecordStore>> {
    let (ledger, _network) = Ledger::in_memory(LedgerConfig::for_store("store-7"));
    Arc::new(Dispatcher::new(ledger))
}

/// Bind to port 0 and return the actual address.
async fn start_server(dispatcher: Arc<Dispatcher<InMemoryRecordStore>>) -> String {
    let app = pos_ledger::router(dispatcher);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check() {
    let base = start_server(test_dispatcher()).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["online"], false);
    assert!(body["operations"]
        .as_array()
        .unwrap()
        .contains(&json!("createAccount")));
}

#[tokio::test]
async fn create_then_fetch() {
    let base = start_server(test_dispatcher()).await;
    let client = reqwest::Client::new();

    let created: Value = client
        .post(format!("{base}/ops/createAccount"))
        .json(&json!([{ "name": "Till 1", "balance": 1000 }]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["success"], true);
    let id = created["account"]["id"].clone();

    let fetched: Value = client
        .post(format!("{base}/ops/getAccountById"))
        .json(&json!([id]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["account"]["name"], "Till 1");
}

#[tokio::test]
async fn failures_are_envelopes_with_status_200() {
    let base = start_server(test_dispatcher()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/ops/doesNotExist"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "success": false, "error": "unsupported operation: doesNotExist" })
    );

    let resp = client
        .post(format!("{base}/ops/getAllAccounts"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid argument: "));
}
