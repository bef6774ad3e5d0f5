//! Ollama-backed language model for erudito.
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

/// Errors raised while talking to the Ollama runtime.
pub mod error;
/// Completion through the Ollama generate endpoint.
pub mod inference;
/// Model discovery and pulling.
pub mod manager;
/// Ollama wire types.
pub mod models;

pub use error::{LocalError, Result};
pub use inference::OllamaLanguageModel;
pub use manager::OllamaManager;
pub use models::{OllamaGenerateRequest, OllamaGenerateResponse, OllamaModel};
