//! Integration Tests for the Mammogram Gateway
//!
//! These tests run the gateway against a stub segmentation service over real
//! HTTP, testing the system as a whole rather than individual units.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mammogram_gateway::{ClientError, GatewayClient, RatingLabel, ViewerState};
use serde_json::{Value, json};
use tower::util::ServiceExt;

mod common;
use common::*;

async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, axum::body::Bytes) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body)
}

fn error_code(body: &[u8]) -> String {
    let json: Value = serde_json::from_slice(body).unwrap();
    json["code"].as_str().unwrap().to_string()
}

// ============================================================================
// Segmentation Route
// ============================================================================

mod segmentation_route {
    use super::*;

    #[tokio::test]
    async fn test_relays_upstream_body_verbatim() {
        init_test_logging();
        let (api_url, upstream) = spawn_upstream(UpstreamBehavior::Echo).await;
        let (app, _) = create_gateway(&api_url, GatewayOptions::default());

        let (status, body) = post(
            app,
            "/api/segmentation",
            json!({ "base64Image": "aGVsbG8=" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, echo_body("aGVsbG8=").as_bytes());
        assert_eq!(upstream.received(), vec![json!({ "base64Image": "aGVsbG8=" })]);
    }

    #[tokio::test]
    async fn test_strips_data_url_before_forwarding() {
        let (api_url, upstream) = spawn_upstream(UpstreamBehavior::Echo).await;
        let (app, _) = create_gateway(&api_url, GatewayOptions::default());

        let (status, _) = post(
            app,
            "/api/segmentation",
            json!({ "base64Image": "data:image/png;base64,aGVsbG8=" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(upstream.received()[0]["base64Image"], "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_upstream() {
        let (api_url, upstream) = spawn_upstream(UpstreamBehavior::Echo).await;
        let (app, _) = create_gateway(&api_url, GatewayOptions::default());

        let (status, body) = post(
            app.clone(),
            "/api/segmentation",
            json!({ "base64Image": "definitely not base64" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "invalid_request");

        let (status, body) = post(app, "/api/segmentation", json!({ "base64Image": 42 })).await;
        assert!(status.is_client_error());
        assert_eq!(error_code(&body), "invalid_body");

        assert!(upstream.received().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_bad_gateway() {
        let (api_url, _) = spawn_upstream(UpstreamBehavior::Fail(500)).await;
        let (app, _) = create_gateway(&api_url, GatewayOptions::default());

        let (status, body) = post(app, "/api/segmentation", json!({ "base64Image": "QUJD" })).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(error_code(&body), "upstream_error");
        let json: Value = serde_json::from_slice(&body).unwrap();
        let message = json["error"].as_str().unwrap();
        assert_eq!(
            message,
            "Segmentation service returned status 500: Internal Server Error"
        );
        assert!(!message.contains("Traceback"));
        assert!(!message.contains("/srv/model"));
    }

    #[tokio::test]
    async fn test_hung_upstream_times_out() {
        let (api_url, _) = spawn_upstream(UpstreamBehavior::Hang(Duration::from_secs(30))).await;
        let (app, _) = create_gateway(
            &api_url,
            GatewayOptions {
                timeout: Duration::from_millis(200),
                ..GatewayOptions::default()
            },
        );

        let started = Instant::now();
        let (status, body) = post(app, "/api/segmentation", json!({ "base64Image": "QUJD" })).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(error_code(&body), "upstream_timeout");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_fails_observably() {
        let api_url = unreachable_url().await;
        let (app, _) = create_gateway(&api_url, GatewayOptions::default());

        let (status, body) = post(app, "/api/segmentation", json!({ "base64Image": "QUJD" })).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(error_code(&body), "upstream_unreachable");
    }

    #[tokio::test]
    async fn test_malformed_upstream_response() {
        let (api_url, _) = spawn_upstream(UpstreamBehavior::Malformed).await;
        let (app, _) = create_gateway(&api_url, GatewayOptions::default());

        let (status, body) = post(app, "/api/segmentation", json!({ "base64Image": "QUJD" })).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(error_code(&body), "invalid_upstream_response");
    }

    #[tokio::test]
    async fn test_repeated_calls_are_independent_without_history() {
        let (api_url, upstream) = spawn_upstream(UpstreamBehavior::Echo).await;
        let (app, store) = create_gateway(&api_url, GatewayOptions::default());

        for _ in 0..2 {
            let (status, _) =
                post(app.clone(), "/api/segmentation", json!({ "base64Image": "QUJD" })).await;
            assert_eq!(status, StatusCode::OK);
        }

        assert_eq!(upstream.received().len(), 2);
        assert_eq!(store.segmentation_count().await, 0);
    }

    #[tokio::test]
    async fn test_history_records_failures_too() {
        let (api_url, _) = spawn_upstream(UpstreamBehavior::Fail(503)).await;
        let (app, store) = create_gateway(
            &api_url,
            GatewayOptions {
                history_enabled: true,
                ..GatewayOptions::default()
            },
        );

        let (status, _) = post(app.clone(), "/api/segmentation", json!({ "base64Image": "QUJD" })).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        wait_for_segmentations(&store, 1).await;
        assert_eq!(store.segmentation_count().await, 1);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/segmentation")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let records: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(records[0]["outcome"], "remote_error");
        assert_eq!(records[0]["imageLength"], 4);
        assert!(records[0].get("base64Image").is_none());
    }

    #[tokio::test]
    async fn test_body_limit_is_enforced() {
        let (api_url, upstream) = spawn_upstream(UpstreamBehavior::Echo).await;
        let (app, _) = create_gateway(
            &api_url,
            GatewayOptions {
                body_limit: 1024,
                ..GatewayOptions::default()
            },
        );

        let big = "A".repeat(4096);
        let (status, body) = post(app, "/api/segmentation", json!({ "base64Image": big })).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&body), "payload_too_large");
        assert!(upstream.received().is_empty());
    }
}

// ============================================================================
// Rating Route
// ============================================================================

mod rating_route {
    use super::*;

    #[tokio::test]
    async fn test_rating_creates_one_document() {
        let (app, store) = create_gateway("http://127.0.0.1:9", GatewayOptions::default());

        let (status, body) = post(app, "/api/rating", json!({ "ratingIsGood": true })).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body.is_empty());

        let ratings = store.ratings().await;
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, RatingLabel::Good);
        assert_eq!(ratings[0].rating_value, 1);
    }

    #[tokio::test]
    async fn test_rating_requires_json_content_type() {
        let (app, store) = create_gateway("http://127.0.0.1:9", GatewayOptions::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/rating")
                    .body(Body::from(r#"{"ratingIsGood": true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(store.rating_count().await, 0);
    }
}

// ============================================================================
// Operational Routes
// ============================================================================

mod operational {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_memory_store() {
        let (app, _) = create_gateway("http://127.0.0.1:9", GatewayOptions::default());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["store"], "memory");
        assert!(json["version"].is_string());
    }
}

// ============================================================================
// Client Service Layer
// ============================================================================

mod client {
    use super::*;

    #[tokio::test]
    async fn test_post_mammogram_returns_segmented_image() {
        let (api_url, _) = spawn_upstream(UpstreamBehavior::Echo).await;
        let (gateway_url, _) = spawn_gateway(&api_url).await;
        let client = GatewayClient::new(&gateway_url);

        let segmented = client.post_mammogram("aGVsbG8=").await.unwrap();

        assert_eq!(segmented, "seg-aGVsbG8=");
    }

    #[tokio::test]
    async fn test_post_rating_stores_encoded_verdict() {
        let (gateway_url, store) = spawn_gateway("http://127.0.0.1:9").await;
        let client = GatewayClient::new(&gateway_url);

        client.post_rating(true).await.unwrap();
        client.post_rating(false).await.unwrap();

        let ratings = store.ratings().await;
        assert_eq!(ratings.len(), 2);
        assert_eq!((ratings[0].rating, ratings[0].rating_value), (RatingLabel::Good, 1));
        assert_eq!((ratings[1].rating, ratings[1].rating_value), (RatingLabel::Bad, 0));
    }

    #[tokio::test]
    async fn test_gateway_error_surfaces_status_and_code() {
        let (api_url, _) = spawn_upstream(UpstreamBehavior::Fail(500)).await;
        let (gateway_url, _) = spawn_gateway(&api_url).await;
        let client = GatewayClient::new(&gateway_url);

        let err = client.post_mammogram("QUJD").await.unwrap_err();

        match err {
            ClientError::Status { status, code, .. } => {
                assert_eq!(status.as_u16(), 502);
                assert_eq!(code.as_deref(), Some("upstream_error"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let client = GatewayClient::new(&unreachable_url().await);

        let err = client.post_rating(true).await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn test_viewer_state_flow() {
        let (api_url, upstream) = spawn_upstream(UpstreamBehavior::Echo).await;
        let (gateway_url, store) = spawn_gateway(&api_url).await;
        let client = GatewayClient::new(&gateway_url);

        let mut state = ViewerState::new();
        state.load_data_url("data:image/png;base64,QUJD");
        state.submit(&client).await.unwrap();

        assert_eq!(upstream.received()[0]["base64Image"], "QUJD");
        assert_eq!(state.segmented_image_base64, "seg-QUJD");
        assert!(state.show_rating_component);

        state.rate(&client, false).await.unwrap();

        assert!(!state.show_rating_component);
        assert_eq!(store.ratings().await[0].rating, RatingLabel::Bad);
    }
}
