//! HTTP route handlers for the segmentation API

use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::types::{
    SegmentationError, SegmentationOutcome, SegmentationRecord, SegmentationRequest,
};
use crate::server::{AppState, BodyRejection, JsonBody};
use crate::store::StoreError;

/// Error response for the segmentation API
#[derive(Debug, Serialize)]
pub struct SegmentationErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<SegmentationError> for SegmentationErrorResponse {
    fn from(e: SegmentationError) -> Self {
        let code = match &e {
            SegmentationError::InvalidRequest(_) => "invalid_request",
            SegmentationError::Timeout(_) => "upstream_timeout",
            SegmentationError::Transport(_) => "upstream_unreachable",
            SegmentationError::Remote { .. } => "upstream_error",
            SegmentationError::InvalidResponse(_) => "invalid_upstream_response",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl From<StoreError> for SegmentationErrorResponse {
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

impl IntoResponse for SegmentationErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "invalid_request" => StatusCode::BAD_REQUEST,
            "upstream_timeout" => StatusCode::GATEWAY_TIMEOUT,
            "upstream_unreachable" | "upstream_error" | "invalid_upstream_response" => {
                StatusCode::BAD_GATEWAY
            }
            "store_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// POST /api/segmentation - Forward an image to the segmentation service
///
/// Responds with the service's body verbatim on success.
pub async fn post_segmentation(
    State(state): State<AppState>,
    payload: Result<JsonBody<SegmentationRequest>, BodyRejection>,
) -> Result<Response, SegmentationErrorResponse> {
    let JsonBody(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!("Rejected segmentation body ({})", rejection.code());
            counter!(
                "gateway_segmentation_requests_total",
                "outcome" => SegmentationOutcome::InvalidRequest.as_str()
            )
            .increment(1);
            return Ok(rejection.into_response());
        }
    };

    let request = request.validate().map_err(|e| {
        warn!("Rejected segmentation request: {}", e);
        counter!("gateway_segmentation_requests_total", "outcome" => e.outcome().as_str())
            .increment(1);
        SegmentationErrorResponse::from(e)
    })?;

    let request_id = Uuid::new_v4();
    let image_length = request.base64_image.len();
    let started = Instant::now();

    let result = state.segmentation_service.segment(&request).await;

    let elapsed = started.elapsed();
    let outcome = match &result {
        Ok(_) => SegmentationOutcome::Success,
        Err(e) => e.outcome(),
    };
    counter!("gateway_segmentation_requests_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("gateway_segmentation_duration_seconds").record(elapsed.as_secs_f64());

    // History is written off the response path
    if state.history_enabled {
        let store = state.store.clone();
        let record = SegmentationRecord::new(request_id, image_length, outcome, elapsed);
        tokio::spawn(async move {
            if let Err(e) = store.insert_segmentation(&record).await {
                warn!("Failed to record segmentation {}: {}", record.id, e);
            }
        });
    }

    match result {
        Ok(response) => {
            info!(
                "Segmentation {} succeeded: {} chars in, {} chars out, {:?}",
                request_id,
                image_length,
                response.result.segmented_image.len(),
                elapsed
            );
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                response.body,
            )
                .into_response())
        }
        Err(e) => {
            warn!(
                "Segmentation {} failed after {:?} ({}): {}",
                request_id,
                elapsed,
                outcome.as_str(),
                e
            );
            Err(SegmentationErrorResponse::from(e))
        }
    }
}

/// GET /api/segmentation - List recorded segmentation calls, newest first
pub async fn list_segmentations(
    State(state): State<AppState>,
) -> Result<Json<Vec<SegmentationRecord>>, SegmentationErrorResponse> {
    let records = state.store.list_segmentations().await.map_err(|e| {
        tracing::error!("Failed to list segmentation records: {}", e);
        SegmentationErrorResponse::from(e)
    })?;

    Ok(Json(records))
}

/// Build segmentation API routes; the listing is mounted only with history enabled
pub fn segmentation_routes(history_enabled: bool) -> Router<AppState> {
    let method_router = post(post_segmentation);
    let method_router = if history_enabled {
        method_router.get(list_segmentations)
    } else {
        method_router
    };

    Router::new().route("/api/segmentation", method_router)
}
