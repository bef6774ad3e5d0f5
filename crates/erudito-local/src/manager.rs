use crate::models::{OllamaListResponse, OllamaModel};
use crate::{LocalError, Result};
use erudito_core::{OllamaConfig, model_name_matches};
use reqwest::Client;
use tracing::info;

/// Manages models installed in the Ollama runtime
pub struct OllamaManager {
    /// HTTP client used to interact with the Ollama service.
    client: Client,
    /// Base URL pointing to the Ollama runtime.
    base_url: String,
}

impl OllamaManager {
    /// Create a manager for the configured Ollama server.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured host is not a usable address
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        Ok(Self::with_url(config.base_url()?))
    }

    /// Create a manager for an explicit base URL.
    #[must_use]
    pub fn with_url(url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: url.trim_end_matches('/').to_owned(),
        }
    }

    /// Base URL of the Ollama runtime.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Ollama is running
    pub async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }

    /// List installed models
    ///
    /// # Errors
    ///
    /// Returns an error if Ollama is not available or if the response cannot be parsed
    pub async fn list_models(&self) -> Result<Vec<OllamaModel>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|err| LocalError::OllamaUnavailable(err.to_string()))?;

        let list: OllamaListResponse = response.error_for_status()?.json().await?;
        Ok(list.models)
    }

    /// Check if a specific model is installed
    ///
    /// # Errors
    ///
    /// Returns an error if the model list cannot be retrieved
    pub async fn has_model(&self, model_name: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models
            .iter()
            .any(|model| model_name_matches(&model.name, model_name)))
    }

    /// Pull a model from Ollama registry
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be pulled
    pub async fn pull_model(&self, model_name: &str) -> Result<()> {
        info!("⬇️  Pulling model '{model_name}' (this may take a few minutes)...");
        let response = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&serde_json::json!({
                "name": model_name,
                "stream": false
            }))
            .send()
            .await?;

        if response.status().is_success() {
            info!("✓ Pulled model '{model_name}'");
            Ok(())
        } else {
            Err(LocalError::ModelPullFailed(format!(
                "Failed to pull model {}: {}",
                model_name,
                response.status()
            )))
        }
    }

    /// Ensure a model is available, pulling if necessary
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be verified or pulled
    pub async fn ensure_model(&self, model_name: &str) -> Result<()> {
        if !self.has_model(model_name).await? {
            self.pull_model(model_name).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_manager_creation() {
        let manager = OllamaManager::new(&OllamaConfig::default()).expect("manager");
        assert_eq!(manager.base_url(), "http://localhost:11434");
    }

    #[test]
    fn custom_url_drops_trailing_slash() {
        let manager = OllamaManager::with_url("http://custom:8080/".to_owned());
        assert_eq!(manager.base_url(), "http://custom:8080");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let config = OllamaConfig {
            host: "http://".to_owned(),
            port: 11434,
        };
        assert!(matches!(
            OllamaManager::new(&config),
            Err(LocalError::Core(erudito_core::Error::Config(_)))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let manager = OllamaManager::with_url("http://127.0.0.1:9".to_owned());
        assert!(!manager.is_available().await);
        assert!(matches!(
            manager.list_models().await,
            Err(LocalError::OllamaUnavailable(_))
        ));
    }
}
