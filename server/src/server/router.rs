//! Router assembly

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::state::AppState;
use crate::rating::rating_routes;
use crate::segmentation::segmentation_routes;

/// Build the gateway router: API routes, health, metrics, body limit, access log and CORS
pub fn build_router(state: AppState, max_body_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .merge(segmentation_routes(state.history_enabled))
        .merge(rating_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
}
