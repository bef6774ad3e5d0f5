use async_trait::async_trait;

use crate::Result;

/// A language model that turns a prompt into a completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns a short identifier for this model backend.
    fn name(&self) -> &'static str;

    /// Checks whether the backend is reachable and ready to answer.
    async fn is_available(&self) -> bool;

    /// Completes `prompt`, returning the text of the first completion choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable, the request fails,
    /// or the response cannot be parsed.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
