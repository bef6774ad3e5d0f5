//! HTTP service exposing ingestion and querying

use crate::handlers;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use erudito_core::{EruditoConfig, Error};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

/// Shared state of the HTTP service
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration
    pub config: Arc<EruditoConfig>,
    /// Cancelled when the service shuts down, interrupting running ingestions
    pub shutdown: CancellationToken,
}

/// Query string of `GET /ingest`
#[derive(Debug, Deserialize)]
pub struct IngestParams {
    /// Folder containing the documents
    pub documentation_path: PathBuf,
    /// Model override
    pub model: Option<String>,
}

/// Response of `GET /ingest`
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Human readable outcome
    pub result: String,
    /// `completed` or `interrupted`
    pub status: String,
    /// Chunks embedded by this request
    pub embedded: usize,
}

/// Body of `POST /query`
#[derive(Debug, Deserialize)]
pub struct QueryPayload {
    /// The question to answer
    pub question: String,
    /// Model override
    pub model: Option<String>,
    /// Index directory to ground the answer on
    pub index_path: Option<PathBuf>,
}

/// Response of `POST /query`
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Answer text
    pub result: String,
}

/// Error body returned with non-success statuses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message
    pub error: String,
}

/// Wrapper turning an [`Error`] into an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Status code for the wrapped error.
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
            error if error.is_caller_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.0.is_retryable() {
            warn!("Request failed, the backend may recover: {}", self.0);
        } else if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let body = Json(ErrorBody {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<AppState>,
    Query(params): Query<IngestParams>,
) -> Result<Json<IngestResponse>, ApiError> {
    let report = handlers::ingest(
        &state.config,
        &params.documentation_path,
        params.model.as_deref(),
        handlers::log_progress(),
        &state.shutdown,
    )
    .await?;

    let result = match report.status {
        erudito_context::IngestStatus::Completed => "🙌 Vector store with embeddings created",
        erudito_context::IngestStatus::Interrupted => {
            "❌ Ingestion interrupted, embedded chunks were saved"
        }
    };
    Ok(Json(IngestResponse {
        result: result.to_owned(),
        status: report.status.as_str().to_owned(),
        embedded: report.embedded,
    }))
}

async fn query(
    State(state): State<AppState>,
    Json(payload): Json<QueryPayload>,
) -> Result<Json<QueryResponse>, ApiError> {
    let answer = handlers::query(
        &state.config,
        &payload.question,
        payload.model.as_deref(),
        payload.index_path.as_deref(),
    )
    .await?;
    Ok(Json(QueryResponse {
        result: answer.text,
    }))
}

/// Build the router with permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::any());

    Router::new()
        .route("/health", get(health))
        .route("/ingest", get(ingest))
        .route("/query", post(query))
        .layer(cors_layer)
        .with_state(state)
}

/// Serve on `host:port` until `state.shutdown` is cancelled.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Serving erudito on http://{}", listener.local_addr()?);

    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::NotFound("x".to_owned()), StatusCode::NOT_FOUND),
            (Error::Config("x".to_owned()), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::Precondition("x".to_owned()), StatusCode::BAD_REQUEST),
            (Error::EmptyCorpus("x".to_owned()), StatusCode::BAD_REQUEST),
            (Error::Provider("x".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::CorruptIndex("x".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::UnsupportedFormat("x".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError(error).status_code(), expected);
        }
    }
}
