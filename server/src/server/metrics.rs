//! Prometheus exposition endpoint

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::state::AppState;

/// GET /metrics/prometheus - Render recorded metrics in Prometheus text format
///
/// Answers 404 when no recorder handle was attached to the state.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(ref handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
