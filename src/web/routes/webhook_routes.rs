//! Inbound bot updates. The platform retries anything that is not a 2xx, so
//! every outcome of ingestion answers 200; only a missing or malformed tenant
//! id in the route answers 400.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use futures::FutureExt;
use serde_json::{Value, json};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::telegram::models::Update;
use crate::web::AppState;

async fn telegram_webhook_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let Ok(tenant_id) = Uuid::parse_str(&tenant_id) else {
        debug!(tenant_id = %tenant_id, "Webhook called with an invalid tenant id.");
        return (StatusCode::BAD_REQUEST, Json(json!({ "ok": false })));
    };

    let update: Update = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!(%tenant_id, error = %e, "Unparseable update body, treating as empty.");
        Update::default()
    });

    match AssertUnwindSafe(app_state.ingestor.handle_update(tenant_id, update))
        .catch_unwind()
        .await
    {
        Ok(outcome) => {
            debug!(%tenant_id, ?outcome, "Update handled.");
            (StatusCode::OK, Json(json!({ "ok": true })))
        }
        Err(_) => {
            error!(%tenant_id, "Update handling panicked.");
            (StatusCode::OK, Json(json!({ "ok": false })))
        }
    }
}

async fn missing_tenant_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "ok": false })))
}

pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/telegram/webhook/{tenant_id}",
            post(telegram_webhook_handler),
        )
        .route("/api/telegram/webhook", post(missing_tenant_handler))
        .route("/api/telegram/webhook/", post(missing_tenant_handler))
}
