//! JSON body extractor with structured rejections

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `axum::Json` whose rejection uses the gateway's `{ error, code }` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(BodyRejection))]
pub struct JsonBody<T>(pub T);

/// Rejection for a body that is not the expected JSON shape
#[derive(Debug)]
pub struct BodyRejection {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct BodyRejectionResponse {
    error: String,
    code: &'static str,
}

impl BodyRejection {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        match self.status {
            StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
            StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
            _ => "invalid_body",
        }
    }
}

impl From<JsonRejection> for BodyRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        tracing::debug!("Rejected request body: {}", self.message);
        let body = BodyRejectionResponse {
            code: self.code(),
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
