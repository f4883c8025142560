//! SegmentationService trait and the HTTP implementation

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::types::{SegmentationError, SegmentationRequest, SegmentationResponse};
use crate::config::SegmentationConfig;

/// Longest upstream error body written to the log
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Trait for services that turn a mammogram into a segmented overlay
#[async_trait]
pub trait SegmentationService: Send + Sync {
    /// Segment an already validated image
    async fn segment(
        &self,
        request: &SegmentationRequest,
    ) -> Result<SegmentationResponse, SegmentationError>;
}

/// Segmentation service reached over HTTP (`POST <base>/segment`)
pub struct HttpSegmentationService {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpSegmentationService {
    /// Create the service with a shared HTTP client bounded by the configured timeouts
    pub fn new(config: &SegmentationConfig) -> Result<Self, SegmentationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SegmentationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/segment", config.api_url.trim_end_matches('/')),
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, e: reqwest::Error) -> SegmentationError {
        if e.is_timeout() {
            SegmentationError::Timeout(self.timeout)
        } else if e.is_decode() || e.is_body() {
            SegmentationError::InvalidResponse(e.to_string())
        } else {
            SegmentationError::Transport(e.to_string())
        }
    }
}

/// Upstream failure as reported to callers; the upstream body stays in the log
fn remote_error(status: reqwest::StatusCode) -> SegmentationError {
    SegmentationError::Remote {
        status: status.as_u16(),
        message: status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    }
}

#[async_trait]
impl SegmentationService for HttpSegmentationService {
    async fn segment(
        &self,
        request: &SegmentationRequest,
    ) -> Result<SegmentationResponse, SegmentationError> {
        debug!(
            "Forwarding {} base64 chars to {}",
            request.base64_image.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let detail: String = String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            warn!("Segmentation service answered {}: {}", status, detail);
            return Err(remote_error(status));
        }

        SegmentationResponse::from_body(body)
    }
}
