use crate::OllamaManager;
use crate::models::{OllamaGenerateRequest, OllamaGenerateResponse};
use async_trait::async_trait;
use erudito_core::{Error, LanguageModel, OllamaConfig, Result};
use reqwest::Client;
use std::time::Instant;
use tracing::debug;

/// Language model served by a local Ollama runtime
pub struct OllamaLanguageModel {
    client: Client,
    base_url: String,
    model_name: String,
    manager: OllamaManager,
}

impl OllamaLanguageModel {
    /// Create a model client for `model_name` on the configured server.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configured host is not a usable address
    pub fn new(config: &OllamaConfig, model_name: String) -> Result<Self> {
        Ok(Self::with_url(config.base_url()?, model_name))
    }

    /// Create a model client for an explicit base URL.
    #[must_use]
    pub fn with_url(url: String, model_name: String) -> Self {
        let manager = OllamaManager::with_url(url);
        Self {
            client: Client::new(),
            base_url: manager.base_url().to_owned(),
            model_name,
            manager,
        }
    }

    /// Name of the Ollama model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Make sure the model is installed, pulling it if needed.
    ///
    /// # Errors
    /// Returns an error if Ollama is unreachable or the pull fails
    pub async fn ensure_model_available(&self) -> Result<()> {
        self.manager.ensure_model(&self.model_name).await?;
        Ok(())
    }

    async fn generate_completion(&self, prompt: &str) -> Result<OllamaGenerateResponse> {
        let request = OllamaGenerateRequest {
            model: self.model_name.clone(),
            prompt: prompt.to_owned(),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| Error::Provider(format!("Ollama request failed: {err}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::Config(format!(
                "Model '{}' not found. Run: ollama pull {}",
                self.model_name, self.model_name
            )));
        }
        if !status.is_success() {
            return Err(Error::Provider(format!("Ollama returned error: {status}")));
        }

        response.json().await.map_err(|err| {
            Error::InvalidResponse(format!("Failed to parse Ollama response: {err}"))
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaLanguageModel {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn is_available(&self) -> bool {
        self.manager.is_available().await
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let response = self.generate_completion(prompt).await?;
        debug!(
            "{} answered in {}ms ({} prompt tokens, {} generated)",
            response.model,
            start.elapsed().as_millis(),
            response.prompt_eval_count,
            response.eval_count
        );
        Ok(response.response)
    }
}
