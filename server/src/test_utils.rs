//! Test Utilities Module
//!
//! Provides fixtures and request helpers for router tests.
//! This module is only compiled when running tests.

#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use tower::util::ServiceExt;

use crate::segmentation::{
    SegmentationError, SegmentationRequest, SegmentationResponse, SegmentationService,
};
use crate::server::{AppState, build_router};
use crate::store::InMemoryDocumentStore;

const TEST_BODY_LIMIT: usize = 1024 * 1024;

// ============================================================================
// Stub segmentation service
// ============================================================================

/// Segmentation service that answers locally and remembers what it was sent.
///
/// On success the segmented image is `base64("seg:" + input)`.
pub struct StubSegmentationService {
    calls: Mutex<Vec<String>>,
    failure: Option<SegmentationError>,
}

impl StubSegmentationService {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// A stub that fails every call with `error`
    pub fn failing(error: SegmentationError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    /// Images received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SegmentationService for StubSegmentationService {
    async fn segment(
        &self,
        request: &SegmentationRequest,
    ) -> Result<SegmentationResponse, SegmentationError> {
        self.calls
            .lock()
            .unwrap()
            .push(request.base64_image.clone());

        if let Some(ref error) = self.failure {
            return Err(error.clone());
        }

        let segmented = STANDARD.encode(format!("seg:{}", request.base64_image));
        let body = serde_json::to_vec(&serde_json::json!({ "segmentedImage": segmented }))
            .expect("Failed to serialize stub response");
        SegmentationResponse::from_body(Bytes::from(body))
    }
}

// ============================================================================
// Test Context
// ============================================================================

/// Router wired to a stub segmenter and an in-memory store
pub struct TestContext {
    pub router: Router,
    pub store: Arc<InMemoryDocumentStore>,
    pub segmenter: Arc<StubSegmentationService>,
}

impl TestContext {
    /// Create a context with a succeeding segmenter and history disabled
    pub fn new() -> Self {
        Self::build(StubSegmentationService::new(), false)
    }

    /// Create a context with history enabled
    pub fn with_history() -> Self {
        Self::build(StubSegmentationService::new(), true)
    }

    /// Create a context around a specific segmenter
    pub fn with_segmenter(segmenter: StubSegmentationService) -> Self {
        Self::build(segmenter, false)
    }

    fn build(segmenter: StubSegmentationService, history_enabled: bool) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let segmenter = Arc::new(segmenter);
        let state = AppState::new(segmenter.clone(), store.clone()).with_history(history_enabled);
        Self {
            router: build_router(state, TEST_BODY_LIMIT),
            store,
            segmenter,
        }
    }

    /// Make an HTTP request to the test router
    pub async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    /// Make a GET request and parse JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, uri: &str) -> (StatusCode, Option<T>) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).ok())
    }

    /// Make a POST request with JSON body and parse JSON response
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        uri: &str,
        body: impl serde::Serialize,
    ) -> (StatusCode, Option<T>) {
        let (status, body) = self.post_raw(uri, body).await;
        (status, serde_json::from_slice(&body).ok())
    }

    /// Make a POST request with JSON body and return the raw response body
    pub async fn post_raw(&self, uri: &str, body: impl serde::Serialize) -> (StatusCode, Bytes) {
        let body_bytes = serde_json::to_vec(&body).expect("Failed to serialize body");

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body_bytes))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Wait until `expected` history records have been written in the background
    pub async fn wait_for_segmentations(&self, expected: usize) {
        for _ in 0..200 {
            if self.store.segmentation_count().await >= expected {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("expected {} segmentation records", expected);
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.request(request).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        (status, body)
    }
}
