//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules: a stub segmentation
//! service served over real HTTP, and gateway builders wired to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use mammogram_gateway::config::SegmentationConfig;
use mammogram_gateway::{AppState, HttpSegmentationService, InMemoryDocumentStore, build_router};
use serde_json::Value;
use tokio::net::TcpListener;

pub const TEST_BODY_LIMIT: usize = 1024 * 1024;

/// How the stub segmentation service answers
#[derive(Debug, Clone, Copy)]
pub enum UpstreamBehavior {
    /// 200 with `{"segmentedImage": "seg-<input>", "model": "stub"}`
    Echo,
    /// Respond with this status and a plain-text body
    Fail(u16),
    /// Sleep this long before answering
    Hang(Duration),
    /// 200 with a body that is not JSON
    Malformed,
}

/// Stub of the external segmentation service
#[derive(Clone)]
pub struct StubUpstream {
    behavior: UpstreamBehavior,
    received: Arc<Mutex<Vec<Value>>>,
}

impl StubUpstream {
    /// Bodies received on `/segment`, in order
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

/// Exact body the stub returns for `input` in echo mode
pub fn echo_body(input: &str) -> String {
    format!(r#"{{"segmentedImage": "seg-{}", "model": "stub"}}"#, input)
}

async fn segment(State(upstream): State<StubUpstream>, Json(body): Json<Value>) -> Response {
    upstream.received.lock().unwrap().push(body.clone());

    match upstream.behavior {
        UpstreamBehavior::Echo => {
            let input = body["base64Image"].as_str().unwrap_or_default();
            (
                StatusCode::OK,
                [("Content-Type", "application/json")],
                echo_body(input),
            )
                .into_response()
        }
        UpstreamBehavior::Fail(status) => (
            StatusCode::from_u16(status).unwrap(),
            "segmentation crashed: Traceback (most recent call last):\n  File \"/srv/model/unet.py\", line 42",
        )
            .into_response(),
        UpstreamBehavior::Hang(delay) => {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!({ "segmentedImage": "" })).into_response()
        }
        UpstreamBehavior::Malformed => (StatusCode::OK, "<html>not json</html>").into_response(),
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start a stub segmentation service, returning its base URL
pub async fn spawn_upstream(behavior: UpstreamBehavior) -> (String, StubUpstream) {
    let upstream = StubUpstream {
        behavior,
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/segment", post(segment))
        .with_state(upstream.clone());

    let addr = serve(app).await;
    (format!("http://{}", addr), upstream)
}

/// A base URL nothing is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Options for building a gateway in tests
pub struct GatewayOptions {
    pub timeout: Duration,
    pub history_enabled: bool,
    pub body_limit: usize,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            history_enabled: false,
            body_limit: TEST_BODY_LIMIT,
        }
    }
}

/// Build a gateway router that calls the segmentation service at `api_url`
pub fn create_gateway(
    api_url: &str,
    options: GatewayOptions,
) -> (Router, Arc<InMemoryDocumentStore>) {
    let config = SegmentationConfig {
        api_url: api_url.to_string(),
        timeout: options.timeout,
        connect_timeout: Duration::from_secs(2),
        history_enabled: options.history_enabled,
    };
    let segmenter = HttpSegmentationService::new(&config).unwrap();
    let store = Arc::new(InMemoryDocumentStore::new());

    let state = AppState::new(Arc::new(segmenter), store.clone())
        .with_history(options.history_enabled);

    (build_router(state, options.body_limit), store)
}

/// Start a gateway on an ephemeral port, returning its base URL
pub async fn spawn_gateway(api_url: &str) -> (String, Arc<InMemoryDocumentStore>) {
    let (app, store) = create_gateway(api_url, GatewayOptions::default());
    let addr = serve(app).await;
    (format!("http://{}", addr), store)
}

/// Wait until `expected` history records have been written in the background
pub async fn wait_for_segmentations(store: &InMemoryDocumentStore, expected: usize) {
    for _ in 0..200 {
        if store.segmentation_count().await >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} segmentation records", expected);
}

/// Initialize test logging for detailed output
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mammogram_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
