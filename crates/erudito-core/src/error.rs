use core::result::Result as CoreResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for erudito operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur while ingesting documents or answering questions.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or a required value (such as the model) is missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted index artifacts are missing or incomplete.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller violated an index contract (dimension mismatch, empty index, ...).
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Ingestion produced no chunks at all.
    #[error("Nothing to ingest: {0}")]
    EmptyCorpus(String),

    /// A document could not be converted to plain text.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Persisted index artifacts exist but cannot be decoded or disagree with each other.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// An index artifact could not be encoded or written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The embedding or completion backend failed.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The backend returned a response that could not be used.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient errors like network failures or provider errors.
    /// Nothing in erudito retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Provider(_))
    }

    /// Whether the error was caused by the caller rather than by the environment.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Precondition(_) | Self::EmptyCorpus(_) | Self::NotFound(_)
        )
    }
}
