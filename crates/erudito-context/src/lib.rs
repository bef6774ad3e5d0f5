//! Retrieval side of erudito.
//!
//! Documents are turned into plain text, split into chunks, embedded and stored
//! in a [`VectorIndex`]. Questions are embedded the same way and answered by a
//! language model grounded on the nearest chunk.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::float_cmp,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Test allows"
    )
)]

/// Sentence-aware text chunking.
pub mod chunking;
/// Embedding providers.
pub mod embedding;
/// Document discovery on disk.
pub mod fs_utils;
/// Exact nearest-neighbor index and its persistence.
pub mod index;
/// Document ingestion pipeline.
pub mod ingest;
/// Question answering pipeline.
pub mod query;
/// Plain-text extraction.
pub mod reader;

pub use chunking::{Segmenter, SentenceSplitter};
pub use embedding::{Embedding, EmbeddingProvider, OllamaEmbeddingClient};
pub use index::{Neighbor, VectorIndex};
pub use ingest::{IngestReport, IngestStatus, Ingestor, ProgressCallback};
pub use query::{Answer, QueryEngine};
pub use reader::{PlainTextExtractor, TextExtractor};
