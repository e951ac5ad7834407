//! Port to the external text-generation service and the helpers around it.

use async_trait::async_trait;

use crate::error::GenerationError;

mod client;
mod parse;
mod prompt;

pub use client::{GeneratorConfig, HttpTextGenerator};
pub use parse::{parse_word_list, strip_code_fences};
pub use prompt::{PromptTier, diagnostic_prompt, session_prompt};

/// Turns a prompt into raw generated text.
///
/// A single call either succeeds or fails. Callers choose the fallback.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns `GenerationError` when the generator is unavailable, the call
    /// fails, or the service reports an error.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
