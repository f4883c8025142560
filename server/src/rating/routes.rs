//! HTTP route handlers for the rating API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use metrics::counter;
use serde::Serialize;

use super::types::{Rating, RatingRequest};
use crate::server::{AppState, JsonBody};
use crate::store::StoreError;

/// Error response for the rating API
#[derive(Debug, Serialize)]
pub struct RatingErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<StoreError> for RatingErrorResponse {
    fn from(e: StoreError) -> Self {
        let code = match &e {
            StoreError::Unavailable(_) => "store_unavailable",
            StoreError::Backend(_) | StoreError::InvalidDocument(_) => "store_error",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for RatingErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "store_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// POST /api/rating - Store a thumbs-up/down for a segmentation result
pub async fn post_rating(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RatingRequest>,
) -> Result<StatusCode, RatingErrorResponse> {
    let rating = Rating::from(request);

    state.store.insert_rating(&rating).await.map_err(|e| {
        tracing::error!("Failed to store {} rating: {}", rating.rating.as_str(), e);
        RatingErrorResponse::from(e)
    })?;

    counter!("gateway_ratings_total", "rating" => rating.rating.as_str()).increment(1);
    tracing::debug!("Stored {} rating", rating.rating.as_str());

    Ok(StatusCode::CREATED)
}

/// Build rating API routes
pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/api/rating", post(post_rating))
}
