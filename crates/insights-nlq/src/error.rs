//! Custom error types for query understanding and descriptive analysis.
//!
//! This module provides the error hierarchy using `thiserror`. Note that the
//! extractor and classifier never surface these errors to callers; they are
//! used internally (and by the completion adapter and analysis module, whose
//! public functions are fallible).

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum NlqError {
    /// Remote completion call failed (network, auth, quota, empty response).
    #[error("Remote completion call failed: {0}")]
    RemoteCallFailed(String),

    /// The completion service rejected the model identifier itself.
    ///
    /// This class of failure is retried once against the fallback model.
    #[error("Model '{model}' rejected by completion service: {message}")]
    InvalidModelArgument { model: String, message: String },

    /// A model response did not match the expected format.
    #[error("Failed to parse model response: {0}")]
    ResponseParseFailed(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (for the completion adapter, only with "ai" feature).
    #[cfg(feature = "ai")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<NlqError>,
    },
}

impl NlqError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        NlqError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for log filtering and host handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RemoteCallFailed(_) => "REMOTE_CALL_FAILED",
            Self::InvalidModelArgument { .. } => "INVALID_MODEL_ARGUMENT",
            Self::ResponseParseFailed(_) => "RESPONSE_PARSE_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "ai")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check whether this failure warrants one retry with the fallback model.
    pub fn is_model_argument_error(&self) -> bool {
        match self {
            Self::InvalidModelArgument { .. } => true,
            Self::WithContext { source, .. } => source.is_model_argument_error(),
            _ => false,
        }
    }
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, NlqError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| NlqError::Polars(e).with_context(context))
    }
}
