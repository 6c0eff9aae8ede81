use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Reports the configured dialect and whether the store answers a trivial
/// query. Used by load balancers and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let status = match state.store.ping().await {
        Ok(()) => "OK",
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            "DEGRADED"
        }
    };

    Json(json!({
        "status": status,
        "database": state.store.dialect().name(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
