//! Health endpoint

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Store backend name (`mongodb` or `memory`)
    pub store: &'static str,
    pub store_status: &'static str,
    pub uptime_seconds: u64,
}

/// GET /health - Report whether the document store is reachable
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ready = state.store.is_available().await;

    let (http_status, status, store_status) = if store_ready {
        (StatusCode::OK, "healthy", "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store: state.store.backend(),
            store_status,
            uptime_seconds: state.uptime_seconds(),
        }),
    )
}
