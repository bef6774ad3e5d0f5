//! Building and extending a vector index from a folder of documents.

use crate::chunking::{Segmenter, SentenceSplitter};
use crate::embedding::EmbeddingProvider;
use crate::fs_utils::collect_documents;
use crate::index::VectorIndex;
use crate::reader::{PlainTextExtractor, TextExtractor};
use erudito_core::{Error, Result};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Progress callback invoked with `(embedded, total)` after every chunk
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// How an ingestion run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    /// Every chunk was embedded and saved
    Completed,
    /// Cancelled part-way; the chunks embedded so far were saved
    Interrupted,
}

impl IngestStatus {
    /// Lowercase name used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Directory holding the index artifacts
    pub index_dir: PathBuf,
    /// Whether the run completed
    pub status: IngestStatus,
    /// Number of chunks embedded and stored by this run
    pub embedded: usize,
    /// Number of chunks the documents produced
    pub total_chunks: usize,
    /// Identifiers assigned to the stored chunks
    pub ids: Range<u64>,
}

/// Extracts, splits and embeds documents into a persisted [`VectorIndex`].
pub struct Ingestor<E> {
    embedder: E,
    extractor: Box<dyn TextExtractor>,
    segmenter: Box<dyn Segmenter>,
    index_root: PathBuf,
    progress: Option<ProgressCallback>,
}

impl<E: EmbeddingProvider> Ingestor<E> {
    /// Create an ingestor writing indexes below `index_root`.
    pub fn new(embedder: E, index_root: impl Into<PathBuf>) -> Self {
        Self {
            embedder,
            extractor: Box::new(PlainTextExtractor),
            segmenter: Box::new(SentenceSplitter::default()),
            index_root: index_root.into(),
            progress: None,
        }
    }

    /// Use a different text extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Use a different segmenter.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: Box<dyn Segmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Report progress after every embedded chunk.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Directory the index for `documents_root` is stored in.
    ///
    /// # Errors
    /// Returns [`Error::Precondition`] if the folder has no usable name
    pub fn index_dir_for(&self, documents_root: &Path) -> Result<PathBuf> {
        let name = match documents_root.file_name() {
            Some(name) => name.to_owned(),
            None => documents_root
                .canonicalize()?
                .file_name()
                .map(ToOwned::to_owned)
                .ok_or_else(|| {
                    Error::Precondition(format!(
                        "Cannot derive an index name from {}",
                        documents_root.display()
                    ))
                })?,
        };
        Ok(self.index_root.join(name))
    }

    /// Extract and split every document below `documents_root`.
    ///
    /// Documents that cannot be read or are not text are logged and skipped.
    ///
    /// # Errors
    /// Returns an error if the folder cannot be listed or the extractor fails
    /// for a reason other than reading a single document
    pub fn collect_chunks(&self, documents_root: &Path) -> Result<Vec<String>> {
        let documents = collect_documents(documents_root)?;
        info!("📖 {} documents were found", documents.len());

        let mut chunks = Vec::new();
        for path in documents {
            match self.extractor.extract(&path) {
                Ok(Some(text)) => {
                    let pieces = self.segmenter.split(&text);
                    debug!("{} produced {} chunks", path.display(), pieces.len());
                    chunks.extend(pieces);
                }
                Ok(None) => debug!("Skipping {} because it is empty", path.display()),
                Err(Error::UnsupportedFormat(reason)) => {
                    info!("Skipping {}: {reason}", path.display());
                }
                Err(Error::Io(error)) => {
                    warn!("Skipping unreadable {}: {error}", path.display());
                }
                Err(error) => return Err(error),
            }
        }
        Ok(chunks)
    }

    /// Ingest every document below `documents_root`.
    ///
    /// Cancelling `cancel` stops embedding; the chunks embedded so far are
    /// still saved and the report is [`IngestStatus::Interrupted`].
    ///
    /// # Errors
    /// Returns [`Error::EmptyCorpus`] when the documents yield no text,
    /// [`Error::Precondition`] as soon as an embedding does not match the
    /// dimension of the index, or any embedding or persistence error
    pub async fn ingest(
        &self,
        documents_root: &Path,
        cancel: &CancellationToken,
    ) -> Result<IngestReport> {
        info!("Look for docs in {}", documents_root.display());
        let chunks = self.collect_chunks(documents_root)?;
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus(format!(
                "No documents were found inside {}",
                documents_root.display()
            )));
        }

        let index_dir = self.index_dir_for(documents_root)?;
        let mut index = if VectorIndex::exists(&index_dir) {
            info!("🦾 Updating existing index. This could take a while...");
            VectorIndex::open(&index_dir)?
        } else {
            info!("🚝 Create vector store. This could take a while...");
            VectorIndex::new()
        };

        let total = chunks.len();
        let mut vectors = Vec::with_capacity(total);
        let mut dimension = index.dimension();
        let mut status = IngestStatus::Completed;
        for (position, chunk) in chunks.iter().enumerate() {
            let embedding = select! {
                biased;
                () = cancel.cancelled() => None,
                embedding = self.embedder.embed(chunk) => Some(embedding?),
            };
            let Some(embedding) = embedding else {
                warn!("❌ Stopped at {position} out of {total}");
                status = IngestStatus::Interrupted;
                break;
            };
            let expected = *dimension.get_or_insert(embedding.len());
            if embedding.len() != expected {
                return Err(Error::Precondition(format!(
                    "Chunk {position} embedded to {} dimensions, but {} holds {expected}-dimensional vectors",
                    embedding.len(),
                    index_dir.display()
                )));
            }
            vectors.push(embedding);
            if let Some(progress) = &self.progress {
                progress(vectors.len() as u64, total as u64);
            }
        }

        let embedded = vectors.len();
        let start = index.len() as u64;
        if embedded == 0 {
            return Ok(IngestReport {
                index_dir,
                status,
                embedded,
                total_chunks: total,
                ids: start..start,
            });
        }

        let payloads = chunks.into_iter().take(embedded).collect();
        let ids = index.add_vectors(&vectors, payloads)?;
        index.save(&index_dir)?;
        info!(
            "🥒 Saved {embedded} vectors into {} ({} total)",
            index_dir.display(),
            index.len()
        );

        Ok(IngestReport {
            index_dir,
            status,
            embedded,
            total_chunks: total,
            ids,
        })
    }
}
