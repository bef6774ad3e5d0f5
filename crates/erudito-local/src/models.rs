use serde::{Deserialize, Serialize};

/// Ollama API response for model list
#[derive(Debug, Deserialize)]
pub struct OllamaListResponse {
    /// List of models installed in Ollama.
    pub models: Vec<OllamaModel>,
}

/// Information about an Ollama model returned from the API.
#[derive(Debug, Deserialize)]
pub struct OllamaModel {
    /// Model identifier.
    pub name: String,
    /// Size of the model in bytes.
    #[serde(default)]
    pub size: u64,
    /// Content digest for the model.
    #[serde(default)]
    pub digest: String,
}

/// Ollama API request for generation
#[derive(Debug, Serialize)]
pub struct OllamaGenerateRequest {
    /// Model to use for generation.
    pub model: String,
    /// Input prompt for the model.
    pub prompt: String,
    /// Whether to stream the response.
    pub stream: bool,
}

/// Ollama API response for generation
#[derive(Debug, Deserialize)]
pub struct OllamaGenerateResponse {
    /// Model that generated the response.
    pub model: String,
    /// Generated text content.
    pub response: String,
    /// Whether generation is complete.
    pub done: bool,
    /// Total time taken in nanoseconds.
    #[serde(default)]
    pub total_duration: u64,
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_eval_count: usize,
    /// Number of tokens generated.
    #[serde(default)]
    pub eval_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_non_streaming() {
        let request = OllamaGenerateRequest {
            model: "llama3.2".to_owned(),
            prompt: "Hi".to_owned(),
            stream: false,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"model": "llama3.2", "prompt": "Hi", "stream": false})
        );
    }

    #[test]
    fn test_response_tolerates_missing_counters() {
        let response: OllamaGenerateResponse = serde_json::from_str(
            r#"{"model": "llama3.2", "response": "Hello", "done": true}"#,
        )
        .expect("parse");
        assert_eq!(response.response, "Hello");
        assert_eq!(response.eval_count, 0);
    }

    #[test]
    fn test_list_response() {
        let list: OllamaListResponse = serde_json::from_str(
            r#"{"models": [{"name": "nomic-embed-text:latest", "size": 274302450, "digest": "abc", "modified_at": "2024-01-01"}]}"#,
        )
        .expect("parse");
        assert_eq!(list.models.len(), 1);
        assert_eq!(list.models[0].name, "nomic-embed-text:latest");
    }
}
