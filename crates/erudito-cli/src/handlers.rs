//! Command handlers shared by the CLI and the HTTP service

use erudito_context::{
    Answer, EmbeddingProvider as _, IngestReport, Ingestor, OllamaEmbeddingClient,
    ProgressCallback, QueryEngine, SentenceSplitter, VectorIndex,
};
use erudito_core::{EruditoConfig, Error, Result};
use erudito_local::OllamaLanguageModel;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Terminal progress bar for embedding chunks.
pub fn embedding_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("Embedding 🦖 {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Drive `bar` from ingestion progress reports.
pub fn progress_callback(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |current: u64, total: u64| {
        bar.set_length(total);
        bar.set_position(current);
    })
}

/// Log ingestion progress at debug level, for callers without a terminal.
pub fn log_progress() -> ProgressCallback {
    Arc::new(|current: u64, total: u64| {
        debug!("Embedding 🦖 {current}/{total}");
    })
}

/// Ingest `documentation_path` into `<index root>/<folder name>`.
///
/// Only the embedding model is needed; the completion model is not consulted.
///
/// # Errors
/// Returns an error if the folder does not exist, no embedding model is
/// configured, the embedding model is unavailable or ingestion fails
pub async fn ingest(
    config: &EruditoConfig,
    documentation_path: &Path,
    model: Option<&str>,
    progress: ProgressCallback,
    cancel: &CancellationToken,
) -> Result<IngestReport> {
    let embedding_model = config.select_embedding_model(model)?;
    if !documentation_path.is_dir() {
        return Err(Error::NotFound(format!(
            "Document folder {} does not exist",
            documentation_path.display()
        )));
    }

    let embedder = OllamaEmbeddingClient::new(&config.ollama, embedding_model)?;
    embedder.ensure_model_available().await?;

    let ingestor = Ingestor::new(embedder, &config.index.root)
        .with_segmenter(Box::new(SentenceSplitter::new(config.index.chunk_size)))
        .with_progress(progress);
    let report = ingestor.ingest(documentation_path, cancel).await?;

    info!(
        "Ingested {}/{} chunks into {} ({})",
        report.embedded,
        report.total_chunks,
        report.index_dir.display(),
        report.status.as_str()
    );
    Ok(report)
}

/// Answer `question`, grounded on the index at `index_path` when given.
///
/// # Errors
/// Returns an error if no model is configured, the index is missing or
/// unreadable, a model cannot be pulled, or a model call fails
pub async fn query(
    config: &EruditoConfig,
    question: &str,
    model: Option<&str>,
    index_path: Option<&Path>,
) -> Result<Answer> {
    let models = config.select_models(model)?;
    if let Some(index_path) = index_path {
        if !VectorIndex::exists(index_path) {
            return Err(Error::NotFound(format!(
                "No index found in {}",
                index_path.display()
            )));
        }
    }

    let embedder = OllamaEmbeddingClient::new(&config.ollama, models.embedding)?;
    let language_model = OllamaLanguageModel::new(&config.ollama, models.completion)?;
    if index_path.is_some() {
        embedder.ensure_model_available().await?;
    }
    language_model.ensure_model_available().await?;
    let engine = QueryEngine::new(embedder, Arc::new(language_model));

    info!("Processing question: {question}");
    engine.answer(question, index_path).await
}

/// Render the configuration for display.
///
/// # Errors
/// Returns an error if the configuration cannot be serialized
pub fn describe_config(config: &EruditoConfig, full: bool) -> Result<String> {
    if full {
        return toml::to_string_pretty(config)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")));
    }

    Ok(format!(
        "Ollama: {}\nEmbedding model: {}\nCompletion model: {}\nIndex root: {}\nChunk size: {}\nServer: {}:{}",
        config.ollama.base_url()?,
        config.models.embedding,
        config.models.completion,
        config.index.root.display(),
        config.index.chunk_size,
        config.server.host,
        config.server.port
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ingest_missing_folder_is_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let result = ingest(
            &EruditoConfig::default(),
            &temp.path().join("missing"),
            None,
            log_progress(),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ingest_does_not_need_completion_model() {
        let temp = TempDir::new().expect("temp dir");
        let mut config = EruditoConfig::default();
        config.models.completion = String::new();

        let result = ingest(
            &config,
            &temp.path().join("missing"),
            None,
            log_progress(),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ingest_without_embedding_model_is_config_error() {
        let temp = TempDir::new().expect("temp dir");
        let mut config = EruditoConfig::default();
        config.models.embedding = String::new();

        let result = ingest(
            &config,
            temp.path(),
            None,
            log_progress(),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_ollama_host_is_config_error() {
        let temp = TempDir::new().expect("temp dir");
        let mut config = EruditoConfig::default();
        config.ollama.host = "http://".to_owned();

        let result = ingest(
            &config,
            temp.path(),
            None,
            log_progress(),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_progress_callback_drives_bar() {
        let bar = ProgressBar::hidden();
        let callback = progress_callback(bar.clone());

        callback(3, 7);

        assert_eq!(bar.length(), Some(7));
        assert_eq!(bar.position(), 3);
        assert_eq!(embedding_progress_bar().position(), 0);
    }

    #[tokio::test]
    async fn test_query_without_model_is_config_error() {
        let mut config = EruditoConfig::default();
        config.models.completion = String::new();

        let result = query(&config, "Hello?", None, None).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_query_missing_index_is_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let result = query(
            &EruditoConfig::default(),
            "Hello?",
            Some("llama3.2"),
            Some(temp.path()),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_describe_config() {
        let config = EruditoConfig::default();
        let summary = describe_config(&config, false).expect("summary");
        assert!(summary.contains("Embedding model: nomic-embed-text"));

        let full = describe_config(&config, true).expect("full");
        assert!(full.contains("[models]"));
        assert!(full.contains("chunk_size = 512"));
    }
}
