//! HTTP routes exercised without a network listener.

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use erudito_cli::{AppState, router};
use erudito_core::EruditoConfig;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt as _;

fn state(config: EruditoConfig) -> AppState {
    AppState {
        config: Arc::new(config),
        shutdown: CancellationToken::new(),
    }
}

async fn send(config: EruditoConfig, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state(config))
        .oneshot(request)
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn query_request(body: &Value) -> Request<Body> {
    Request::post("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn test_health() {
    let request = Request::get("/health").body(Body::empty()).expect("request");
    let (status, body) = send(EruditoConfig::default(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_ingest_missing_folder_is_404() {
    let temp = TempDir::new().expect("temp dir");
    let missing = temp.path().join("missing");
    let uri = format!("/ingest?documentation_path={}", missing.display());
    let request = Request::get(uri).body(Body::empty()).expect("request");

    let (status, body) = send(EruditoConfig::default(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("error").contains("does not exist"));
}

#[tokio::test]
async fn test_ingest_requires_documentation_path() {
    let request = Request::get("/ingest").body(Body::empty()).expect("request");
    let (status, _) = send(EruditoConfig::default(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_without_model_is_422() {
    let mut config = EruditoConfig::default();
    config.models.embedding = String::new();
    config.models.completion = String::new();

    let (status, body) = send(config, query_request(&json!({"question": "Hi?"}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["error"]
            .as_str()
            .expect("error")
            .contains("specify the model")
    );
}

#[tokio::test]
async fn test_query_with_missing_index_is_404() {
    let temp = TempDir::new().expect("temp dir");
    let payload = json!({
        "question": "What is the Cloud SIEM Investigator?",
        "model": "llama3.2",
        "index_path": temp.path().join("index").join("manual"),
    });

    let (status, body) = send(EruditoConfig::default(), query_request(&payload)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("error").starts_with("Not found"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .expect("request");
    let response = router(state(EruditoConfig::default()))
        .oneshot(request)
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("cors header"),
        "*"
    );
}
