//! Google Gemini completion provider implementation.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`CompletionProvider`] trait for Google's Gemini API
//! (<https://ai.google.dev/>).
//!
//! The provider carries a two-tier model fallback: requests run against the
//! primary model first, and a failure that rejects the model identifier
//! itself triggers exactly one retry against the configured fallback model.
//! Every other failure class propagates as a structured error.

use std::time::Duration;

use super::CompletionProvider;
use crate::error::{NlqError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default Gemini API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";

/// Default primary model for completions.
const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Default fallback model, used only after a model-identifier rejection.
const DEFAULT_FALLBACK_MODEL: &str = "gemini-1.0-pro";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default temperature for model responses (low for deterministic outputs).
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default max tokens for responses.
const DEFAULT_MAX_TOKENS: u32 = 1024;

// Gemini API request structures
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

// Gemini API response structures
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// The primary model to use (e.g., "gemini-1.5-pro").
    pub model: String,
    /// The model retried once after a model-identifier rejection.
    pub fallback_model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl GeminiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }
}

/// Builder for [`GeminiConfig`].
#[derive(Default)]
pub struct GeminiConfigBuilder {
    model: Option<String>,
    fallback_model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl GeminiConfigBuilder {
    /// Set the primary model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the fallback model.
    pub fn fallback_model(mut self, fallback_model: impl Into<String>) -> Self {
        self.fallback_model = Some(fallback_model.into());
        self
    }

    /// Set the temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiConfig {
        GeminiConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            fallback_model: self
                .fallback_model
                .unwrap_or_else(|| DEFAULT_FALLBACK_MODEL.to_owned()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        }
    }
}

/// Google Gemini completion provider.
///
/// # Example
///
/// ```rust,ignore
/// use insights_nlq::ai::{GeminiConfig, GeminiProvider};
///
/// // Simple usage with defaults
/// let provider = GeminiProvider::new("your-api-key")?;
///
/// // With custom configuration
/// let config = GeminiConfig::builder()
///     .model("gemini-2.0-flash")
///     .fallback_model("gemini-1.5-flash")
///     .temperature(0.2)
///     .build();
/// let provider = GeminiProvider::with_config("your-api-key", config)?;
/// ```
pub struct GeminiProvider {
    api_key: String,
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Create a new Gemini provider with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    fn build_contents(prompt: &str, context: Option<&str>) -> Vec<Content> {
        let mut contents = Vec::with_capacity(2);
        if let Some(context) = context {
            contents.push(Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: context.to_owned(),
                }],
            });
        }
        contents.push(Content {
            role: "user".to_owned(),
            parts: vec![Part {
                text: prompt.to_owned(),
            }],
        });
        contents
    }

    fn call_model(&self, model: &str, prompt: &str, context: Option<&str>) -> Result<String> {
        let request = GeminiRequest {
            contents: Self::build_contents(prompt, context),
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        // Build URL: {base_url}{model}:generateContent?key={api_key}
        let url = format!(
            "{}{}:generateContent?key={}",
            self.config.base_url, model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            // A 400 (or an INVALID_ARGUMENT body) means the service rejected
            // the request itself, typically the model identifier.
            if status.as_u16() == 400 || body.contains("INVALID_ARGUMENT") {
                return Err(NlqError::InvalidModelArgument {
                    model: model.to_owned(),
                    message: body,
                });
            }
            return Err(NlqError::RemoteCallFailed(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let result: GeminiResponse = response.json()?;

        // Extract text from the first candidate's content parts.
        // Gemini may return empty responses or responses blocked by safety
        // filters; both count as a failed call.
        let text = result
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|c| {
                if let Some(reason) = &c.finish_reason
                    && (reason == "SAFETY" || reason == "BLOCKED")
                {
                    return None;
                }
                c.content.as_ref()
            })
            .and_then(|content| content.parts.as_ref())
            .and_then(|parts| parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| {
                NlqError::RemoteCallFailed("No response content from Gemini API".to_owned())
            })?;

        Ok(text)
    }
}

impl CompletionProvider for GeminiProvider {
    fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String> {
        match self.call_model(&self.config.model, prompt, context) {
            Ok(text) => Ok(text),
            Err(e) if e.is_model_argument_error() => {
                warn!(
                    "Model '{}' rejected, retrying with fallback '{}': {}",
                    self.config.model, self.config.fallback_model, e
                );
                let text = self.call_model(&self.config.fallback_model, prompt, context)?;
                debug!("Fallback model '{}' succeeded", self.config.fallback_model);
                Ok(text)
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================
