//! AI module for LLM-backed query understanding.
//!
//! This module provides a trait-based abstraction over text-completion
//! services, allowing the extractor and classifier to work with any backend.
//!
//! # Feature Flag
//!
//! The concrete Gemini provider requires the `ai` feature flag (enabled by
//! default). The [`CompletionProvider`] trait is always available for custom
//! implementations.
//!
//! ```toml
//! # Enable AI support (default)
//! insights_nlq = { version = "0.1", features = ["ai"] }
//!
//! # Disable AI support for a regex-only build
//! insights_nlq = { version = "0.1", default-features = false }
//! ```
//!
//! # Adding a New Provider
//!
//! 1. Create a new file (e.g., `src/ai/openai.rs`)
//! 2. Implement the [`CompletionProvider`] trait
//! 3. Export the new provider in this module
//!
//! # Example
//!
//! ```rust,ignore
//! use insights_nlq::ai::GeminiProvider;
//! use insights_nlq::{EntityExtractor, IntentClassifier};
//!
//! let provider = GeminiProvider::new("your-api-key")?;
//! let entities = EntityExtractor::with_provider(&provider).extract(query);
//! let intent = IntentClassifier::new(&provider).classify(query);
//! ```

// Provider trait is always available (for custom implementations)
mod provider;
pub use provider::{CompletionProvider, FALLBACK_REPLY};

// Concrete provider requires the "ai" feature
#[cfg(feature = "ai")]
mod gemini;

#[cfg(feature = "ai")]
pub use gemini::{GeminiConfig, GeminiConfigBuilder, GeminiProvider};
