//! HTTP transport for the dispatcher. Requires the `http` feature.
//!
//! ## Routes
//!
//! - `POST /ops/:op` : body is the JSON argument array; responds with the
//!   envelope. Always HTTP 200: failures live inside the envelope.
//! - `GET /health` : `{ "ok": true, "operations": [...], "online": bool }`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::{LedgerError, LedgerResult};
use crate::store::RecordStore;

use super::dispatcher::Dispatcher;
use super::envelope::Envelope;

/// Build an axum `Router` over the given dispatcher.
pub fn router<S: RecordStore + 'static>(dispatcher: Arc<Dispatcher<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<S>))
        .route("/ops/:op", post(operation_handler::<S>))
        .with_state(dispatcher)
}

/// Serve the dispatcher over HTTP at `addr` (e.g. `"127.0.0.1:3000"`).
pub async fn serve<S: RecordStore + 'static>(
    dispatcher: Arc<Dispatcher<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(dispatcher);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("event=http_listen module=http status=ok addr={}", addr);
    axum::serve(listener, app).await
}

async fn health_handler<S: RecordStore + 'static>(
    State(dispatcher): State<Arc<Dispatcher<S>>>,
) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "operations": dispatcher.operations(),
        "online": dispatcher.ledger().connectivity().is_online(),
    }))
}

async fn operation_handler<S: RecordStore + 'static>(
    State(dispatcher): State<Arc<Dispatcher<S>>>,
    Path(op): Path<String>,
    body: String,
) -> impl IntoResponse {
    let envelope = match parse_args(&body) {
        Ok(args) => dispatcher.dispatch(&op, args),
        Err(err) => Envelope::failure(&err),
    };
    Json(envelope.to_json())
}

/// An empty body means no arguments.
fn parse_args(body: &str) -> LedgerResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    serde_json::from_str(body)
        .map_err(|err| LedgerError::InvalidArgument(format!("request body: {}", err)))
}
