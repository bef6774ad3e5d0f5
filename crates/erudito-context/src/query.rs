//! Answering questions grounded on the nearest indexed chunk.

use crate::embedding::EmbeddingProvider;
use crate::index::VectorIndex;
use erudito_core::{LanguageModel, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Marker after which a completion is discarded
const STOP_SEQUENCE: &str = "\"\"\"";

/// Render the grounded prompt for `question` given the retrieved `context`.
pub fn render_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following portion of a long document to see if any of the text is relevant to answer the question.\n\nContext: {context}\nQuestion: {question}\nProvide all relevant text to the question verbatim. If nothing relevant return \"I do not know\" and stop answering.\nAnswer:"
    )
}

/// Cut a completion at the first stop sequence.
pub fn truncate_completion(completion: &str) -> &str {
    completion
        .split_once(STOP_SEQUENCE)
        .map_or(completion, |(answer, _)| answer)
}

/// Answer to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Model completion, cut at the stop sequence
    pub text: String,
    /// Retrieved chunk the answer was grounded on
    pub context: Option<String>,
}

/// Embeds questions, retrieves context and asks the language model.
pub struct QueryEngine<E> {
    embedder: E,
    model: Arc<dyn LanguageModel>,
}

impl<E: EmbeddingProvider> QueryEngine<E> {
    /// Create an engine over an embedder and a language model.
    pub fn new(embedder: E, model: Arc<dyn LanguageModel>) -> Self {
        Self { embedder, model }
    }

    /// Answer `question`, grounding it on the index in `index_dir` if given.
    ///
    /// # Errors
    /// Returns an error if the index cannot be loaded, its dimension does not
    /// match the question embedding, or a backend call fails
    pub async fn answer(&self, question: &str, index_dir: Option<&Path>) -> Result<Answer> {
        let (prompt, context) = match index_dir {
            Some(directory) => {
                let index = VectorIndex::open(directory)?;
                let embedding = self.embedder.embed(question).await?;
                let neighbor = index.nearest(&embedding)?;
                debug!(
                    "Nearest chunk {} at distance {}",
                    neighbor.id, neighbor.distance
                );
                let context = neighbor.payload.to_owned();
                (render_prompt(&context, question), Some(context))
            }
            None => (question.to_owned(), None),
        };

        info!("Asking {}", self.model.name());
        let completion = self.model.complete(&prompt).await?;
        Ok(Answer {
            text: truncate_completion(&completion).to_owned(),
            context,
        })
    }
}
