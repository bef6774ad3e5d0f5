//! Embedding functionality.

mod client;

#[cfg(test)]
pub use client::FakeEmbeddingClient;
pub use client::{Embedding, EmbeddingProvider, OllamaEmbeddingClient};
