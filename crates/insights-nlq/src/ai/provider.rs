//! Completion provider trait for abstracting LLM interactions.
//!
//! This module defines the [`CompletionProvider`] trait that enables support
//! for multiple text-completion backends without changing the extractor or
//! classifier logic.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/` (e.g., `openai.rs`)
//! 2. Implement the [`CompletionProvider`] trait for your provider struct
//! 3. Export the provider in `src/ai/mod.rs`

use crate::error::Result;
use tracing::warn;

/// Fixed reply surfaced to conversational callers when the completion
/// service fails on both the primary and the fallback model.
pub const FALLBACK_REPLY: &str = "I'm sorry, I encountered an error processing your request.";

/// Trait for text-completion services.
///
/// This trait abstracts the single outbound call the extractor and classifier
/// depend on: send a prompt (with optional context), get free text back.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Implementations return structured errors via [`crate::error::Result`].
/// The extractor and classifier translate any error into their documented
/// default values; they never propagate it.
pub trait CompletionProvider: Send + Sync {
    /// Send a completion request and return the raw response text.
    ///
    /// `context` is prepended to the conversation when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or produces no usable content.
    /// Implementations with a fallback model should exhaust it before
    /// returning an error.
    fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }

    /// Complete a prompt for a conversational surface.
    ///
    /// Unlike [`CompletionProvider::complete`], this never fails: any error is
    /// logged and replaced with the fixed [`FALLBACK_REPLY`] apology text.
    fn generate_reply(&self, prompt: &str, context: Option<&str>) -> String {
        match self.complete(prompt, context) {
            Ok(text) => text,
            Err(e) => {
                warn!("{} completion failed, returning fallback reply: {}", self.name(), e);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
