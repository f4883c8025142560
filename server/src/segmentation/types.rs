//! Segmentation-related types and error definitions

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while segmenting an image
#[derive(Debug, Clone, Error)]
pub enum SegmentationError {
    #[error("Invalid segmentation request: {0}")]
    InvalidRequest(String),

    #[error("Segmentation service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Segmentation service unreachable: {0}")]
    Transport(String),

    #[error("Segmentation service returned status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Malformed response from segmentation service: {0}")]
    InvalidResponse(String),
}

impl SegmentationError {
    /// Outcome recorded for this failure
    pub fn outcome(&self) -> SegmentationOutcome {
        match self {
            Self::InvalidRequest(_) => SegmentationOutcome::InvalidRequest,
            Self::Timeout(_) => SegmentationOutcome::Timeout,
            Self::Transport(_) => SegmentationOutcome::TransportError,
            Self::Remote { .. } => SegmentationOutcome::RemoteError,
            Self::InvalidResponse(_) => SegmentationOutcome::InvalidResponse,
        }
    }
}

/// Body of `POST /api/segmentation`, also forwarded to the segmentation service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationRequest {
    pub base64_image: String,
}

impl SegmentationRequest {
    pub fn new(base64_image: impl Into<String>) -> Self {
        Self {
            base64_image: base64_image.into(),
        }
    }

    /// Check the payload and strip a `data:<mime>;base64,` prefix if present.
    pub fn validate(self) -> Result<Self, SegmentationError> {
        let payload = strip_data_url(&self.base64_image).trim();

        if payload.is_empty() {
            return Err(SegmentationError::InvalidRequest(
                "base64Image must not be empty".to_string(),
            ));
        }

        // Padding is optional, but when present it must be canonical
        let decoded = if payload.contains('=') {
            STANDARD.decode(payload)
        } else {
            STANDARD_NO_PAD.decode(payload)
        };
        decoded.map_err(|e| {
            SegmentationError::InvalidRequest(format!("base64Image is not valid base64: {}", e))
        })?;

        Ok(Self::new(payload))
    }
}

/// Return the payload part of a data URL, or the input unchanged
pub fn strip_data_url(value: &str) -> &str {
    split_data_url(value).1
}

/// Split `data:<mime>;base64,<payload>` into (prefix including the comma, payload)
pub fn split_data_url(value: &str) -> (&str, &str) {
    if value.starts_with("data:")
        && let Some(idx) = value.find(";base64,")
    {
        let split = idx + ";base64,".len();
        return value.split_at(split);
    }
    ("", value)
}

/// Response of the segmentation service, relayed to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    pub segmented_image: String,
}

/// Successful segmentation: the raw upstream body plus its parsed form
#[derive(Debug, Clone)]
pub struct SegmentationResponse {
    /// Upstream body, relayed byte for byte
    pub body: bytes::Bytes,
    pub result: SegmentationResult,
}

impl SegmentationResponse {
    /// Parse an upstream body, keeping the original bytes
    pub fn from_body(body: bytes::Bytes) -> Result<Self, SegmentationError> {
        let result = serde_json::from_slice::<SegmentationResult>(&body)
            .map_err(|e| SegmentationError::InvalidResponse(e.to_string()))?;
        Ok(Self { body, result })
    }
}

/// How a segmentation call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationOutcome {
    Success,
    InvalidRequest,
    Timeout,
    TransportError,
    RemoteError,
    InvalidResponse,
}

impl SegmentationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::InvalidRequest => "invalid_request",
            Self::Timeout => "timeout",
            Self::TransportError => "transport_error",
            Self::RemoteError => "remote_error",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

/// Metadata about one segmentation call (history feature).
///
/// Never holds image data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Length of the forwarded base64 payload
    pub image_length: u64,
    pub outcome: SegmentationOutcome,
    pub latency_ms: u64,
}

impl SegmentationRecord {
    pub fn new(
        id: Uuid,
        image_length: usize,
        outcome: SegmentationOutcome,
        latency: Duration,
    ) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            image_length: image_length as u64,
            outcome,
            latency_ms: latency.as_millis() as u64,
        }
    }
}
