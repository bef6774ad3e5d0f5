//! Core types and traits for erudito.
//!
//! This crate provides the error taxonomy, configuration, and the language model
//! trait shared by the ingestion and query pipelines.
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

/// Configuration loading and model selection.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Trait definitions for model backends.
pub mod traits;

pub use config::{
    EruditoConfig, IndexConfig, ModelConfig, ModelSelection, OllamaConfig, ServerConfig,
    model_name_matches,
};
pub use error::{Error, Result};
pub use traits::LanguageModel;
