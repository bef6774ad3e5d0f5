//! Embedding generation using Ollama.

use erudito_core::{Error, OllamaConfig, Result, model_name_matches};
use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use std::future::Future;

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// Trait for generating embeddings from text
pub trait EmbeddingProvider: Send + Sync {
    /// Ensure the embedding model is available
    ///
    /// # Errors
    /// Returns an error if the model is not available or cannot be loaded
    fn ensure_model_available(&self) -> impl Future<Output = Result<()>> + Send;

    /// Generate embedding for text
    ///
    /// # Errors
    /// Returns an error if embedding generation fails
    fn embed(&self, text: &str) -> impl Future<Output = Result<Embedding>> + Send;
}

/// Ollama embedding client
pub struct OllamaEmbeddingClient {
    ollama: Ollama,
    model: String,
}

impl OllamaEmbeddingClient {
    /// Create a client for `model` on the configured Ollama server.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configured host is not a usable address
    pub fn new(config: &OllamaConfig, model: String) -> Result<Self> {
        Ok(Self {
            ollama: Ollama::from_url(config.url()?),
            model,
        })
    }

    /// Name of the embedding model.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl EmbeddingProvider for OllamaEmbeddingClient {
    async fn ensure_model_available(&self) -> Result<()> {
        let models = match self.ollama.list_local_models().await {
            Ok(models) => models,
            Err(error) => {
                return Err(Error::Provider(format!(
                    "Failed to connect to Ollama: {error}.\n\nPlease ensure Ollama is installed and running:\n  - Install from: https://ollama.ai\n  - Start with: ollama serve"
                )));
            }
        };

        if models
            .iter()
            .any(|model| model_name_matches(&model.name, &self.model))
        {
            return Ok(());
        }

        tracing::info!("⚙️  Embedding model '{}' not found", self.model);
        tracing::info!("⬇️  Pulling model from Ollama (this may take a few minutes)...");
        let status = self
            .ollama
            .pull_model(self.model.clone(), false)
            .await
            .map_err(|error| {
                Error::Provider(format!(
                    "Failed to pull embedding model '{}': {error}",
                    self.model
                ))
            })?;
        tracing::info!(
            "✓ Pulled embedding model '{}' ({})",
            self.model,
            status.message
        );

        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), text.to_owned().into());

        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| {
                let error_str = format!("{error:?}");
                if error_str.contains("model") && error_str.contains("not found") {
                    Error::Config(format!(
                        "Embedding model '{}' not found. Run: ollama pull {}",
                        self.model, self.model
                    ))
                } else {
                    Error::Provider(format!("Embedding generation failed: {error}"))
                }
            })?;

        // Ollama returns Vec<Vec<f32>>, one per input
        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("No embeddings returned".into()))
    }
}

/// Test-only fake embedding provider (deterministic, hash-based)
///
/// Use this for testing index and pipeline behavior without requiring Ollama.
#[cfg(test)]
pub struct FakeEmbeddingClient;

#[cfg(test)]
impl EmbeddingProvider for FakeEmbeddingClient {
    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(Self::fake_embedding(text))
    }
}

#[cfg(test)]
impl FakeEmbeddingClient {
    /// Dimension of fake embeddings
    pub const DIMENSION: usize = 16;

    /// Generate fake deterministic embedding for testing
    pub fn fake_embedding(text: &str) -> Embedding {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash as _, Hasher as _};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let hash = hasher.finish();

        let mut vec = Vec::with_capacity(Self::DIMENSION);
        for idx in 0..Self::DIMENSION {
            let value = ((hash.wrapping_add(idx as u64 * 7919)) % 1000) as f32 / 1000.0;
            vec.push(value);
        }
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client =
            OllamaEmbeddingClient::new(&OllamaConfig::default(), "nomic-embed-text".to_owned())
                .expect("client");
        assert_eq!(client.model(), "nomic-embed-text");
        assert_eq!(client.ollama.url_str(), "http://localhost:11434/");
    }

    #[test]
    fn client_accepts_host_port_form() {
        let config = OllamaConfig {
            host: "127.0.0.1:11434".to_owned(),
            port: 1,
        };
        let client = OllamaEmbeddingClient::new(&config, "nomic-embed-text".to_owned())
            .expect("client");
        assert_eq!(client.ollama.url_str(), "http://127.0.0.1:11434/");
    }

    #[test]
    fn invalid_host_is_config_error() {
        let config = OllamaConfig {
            host: "http://".to_owned(),
            port: 11434,
        };
        assert!(matches!(
            OllamaEmbeddingClient::new(&config, "nomic-embed-text".to_owned()),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn fake_embeddings_are_deterministic() {
        let first = FakeEmbeddingClient.embed("hello").await.expect("embed");
        let second = FakeEmbeddingClient.embed("hello").await.expect("embed");
        let other = FakeEmbeddingClient.embed("world").await.expect("embed");

        assert_eq!(first.len(), FakeEmbeddingClient::DIMENSION);
        assert_eq!(first, second);
        assert_ne!(first, other);
    }
}
