//! Embedding client against an in-process stand-in for the Ollama HTTP API.

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

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use erudito_context::{EmbeddingProvider, OllamaEmbeddingClient};
use erudito_core::OllamaConfig;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Pulls = Arc<Mutex<Vec<String>>>;

async fn tags() -> Json<Value> {
    Json(json!({
        "models": [
            {"name": "nomic-embed-text:latest", "modified_at": "2024-05-01T10:00:00Z", "size": 274_302_450u64}
        ]
    }))
}

async fn pull(State(pulls): State<Pulls>, Json(body): Json<Value>) -> Json<Value> {
    let model = body["model"]
        .as_str()
        .or_else(|| body["name"].as_str())
        .unwrap_or_default()
        .to_owned();
    pulls.lock().expect("lock").push(model);
    Json(json!({"status": "success"}))
}

async fn embed() -> Json<Value> {
    Json(json!({"embeddings": [[0.25, -0.5, 1.0]]}))
}

async fn spawn_server(pulls: Pulls) -> OllamaConfig {
    let app = Router::new()
        .route("/api/tags", get(tags))
        .route("/api/pull", post(pull))
        .route("/api/embed", post(embed))
        .with_state(pulls);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    // Ollama's own `host:port` form, as OLLAMA_HOST is usually written
    OllamaConfig {
        host: address.to_string(),
        port: 11434,
    }
}

#[tokio::test]
async fn test_installed_model_is_not_pulled_again() {
    let pulls = Pulls::default();
    let config = spawn_server(Arc::clone(&pulls)).await;
    let client = OllamaEmbeddingClient::new(&config, "nomic-embed-text".to_owned()).expect("client");

    client.ensure_model_available().await.expect("ensure");

    assert!(pulls.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn test_missing_model_is_pulled_from_configured_server() {
    let pulls = Pulls::default();
    let config = spawn_server(Arc::clone(&pulls)).await;
    let client = OllamaEmbeddingClient::new(&config, "embed".to_owned()).expect("client");

    client.ensure_model_available().await.expect("ensure");

    assert_eq!(*pulls.lock().expect("lock"), vec!["embed".to_owned()]);
}

#[tokio::test]
async fn test_embed_returns_first_vector() {
    let config = spawn_server(Pulls::default()).await;
    let client = OllamaEmbeddingClient::new(&config, "nomic-embed-text".to_owned()).expect("client");

    let embedding = client.embed("hello").await.expect("embed");

    assert_eq!(embedding, vec![0.25f32, -0.5, 1.0]);
}
