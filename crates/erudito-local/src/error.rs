use core::result::Result as CoreResult;
use thiserror::Error;

/// Result alias for Ollama runtime operations
pub type Result<T> = CoreResult<T, LocalError>;

/// Failure talking to the Ollama runtime
#[derive(Debug, Error)]
pub enum LocalError {
    /// Error raised by erudito itself, such as a bad Ollama address
    #[error(transparent)]
    Core(#[from] erudito_core::Error),

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ollama could not be reached
    #[error("Ollama not available: {0}")]
    OllamaUnavailable(String),

    /// The requested model is not installed
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Pulling a model did not succeed
    #[error("Model pull failed: {0}")]
    ModelPullFailed(String),
}

impl From<LocalError> for erudito_core::Error {
    fn from(error: LocalError) -> Self {
        match error {
            LocalError::Core(inner) => inner,
            LocalError::Http(inner) => Self::Request(inner),
            LocalError::ModelNotFound(model) => Self::Config(format!(
                "Model '{model}' is not installed. Run: ollama pull {model}"
            )),
            other @ (LocalError::OllamaUnavailable(_) | LocalError::ModelPullFailed(_)) => {
                Self::Provider(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_becomes_config_error() {
        let error: erudito_core::Error = LocalError::ModelNotFound("llama3.2".to_owned()).into();
        assert!(matches!(error, erudito_core::Error::Config(_)));
        assert!(error.to_string().contains("ollama pull llama3.2"));
    }

    #[test]
    fn test_unavailable_becomes_provider_error() {
        let error: erudito_core::Error =
            LocalError::OllamaUnavailable("connection refused".to_owned()).into();
        assert!(error.is_retryable());
    }
}
