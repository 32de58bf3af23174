//! Miscellaneous REST handlers.

use axum::Json;
use serde_json::{Value, json};

/// Health check endpoint for load balancers and probes.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
