//! Typed wrappers over the gateway's HTTP API

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::rating::RatingRequest;
use crate::segmentation::{SegmentationRequest, SegmentationResult};

/// Errors surfaced by [`GatewayClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to gateway failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway responded with {status}: {message}")]
    Status {
        status: StatusCode,
        /// `code` from the gateway's error body, when it sent one
        code: Option<String>,
        message: String,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
}

/// Client for the gateway's `/api/segmentation` and `/api/rating` routes.
///
/// Plain request/response: no retry, caching or deduplication.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a client for the gateway at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a base64 mammogram and return the segmented image as base64
    pub async fn post_mammogram(&self, base64_image: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/api/segmentation"))
            .json(&SegmentationRequest::new(base64_image))
            .send()
            .await?;

        let response = check_status(response).await?;
        let result: SegmentationResult = response.json().await?;
        Ok(result.segmented_image)
    }

    /// Submit a thumbs-up (`true`) or thumbs-down (`false`)
    pub async fn post_rating(&self, rating_is_good: bool) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/api/rating"))
            .json(&RatingRequest { rating_is_good })
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`ClientError::Status`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.error),
        Err(_) => (None, text),
    };

    Err(ClientError::Status {
        status,
        code,
        message,
    })
}
