//! Natural-Language Data Query Understanding
//!
//! A query-understanding core built with Rust and Polars: turn free-text data
//! questions into structured entities and an intent label, and produce
//! descriptive summaries of the datasets the questions are about.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Entity Extraction**: Ordered regex rules for columns, filters,
//!   aggregations, and time ranges, with an optional AI fallback for queries
//!   the rules cannot parse
//! - **Intent Classification**: AI-backed classification into a fixed label
//!   set with graceful defaults when the model misbehaves
//! - **Completion Adapter**: A Gemini-backed provider with a two-tier model
//!   fallback, behind a trait so other backends can be plugged in
//! - **Descriptive Analysis**: Dataset summaries and IQR outlier detection
//!   over Polars dataframes
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use insights_nlq::ai::GeminiProvider;
//! use insights_nlq::{EntityExtractor, IntentClassifier};
//!
//! let provider = GeminiProvider::new(api_key)?;
//!
//! let query = "show sales, profit from orders where region = 'west'";
//! let entities = EntityExtractor::with_provider(&provider).extract(query);
//! let intent = IntentClassifier::new(&provider).classify(query);
//!
//! println!("{} ({:.2})", intent.intent, intent.confidence);
//! println!("{}", serde_json::to_string_pretty(&entities)?);
//! ```
//!
//! Extraction and classification never fail: a dead network or a confused
//! model degrades to empty entities and a default intent, not an error.
//!
//! # AI Providers
//!
//! Outbound completion calls go through the [`ai::CompletionProvider`] trait.
//! The built-in [`ai::GeminiProvider`] (behind the default `ai` feature)
//! retries an invalid-model rejection once against a configurable fallback
//! model. See the [`ai`] module documentation for implementing your own
//! provider.
//!
//! # Descriptive Analysis
//!
//! ```rust,ignore
//! use insights_nlq::analysis;
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//!
//! let summary = analysis::summarize(&df)?;
//! let outliers = analysis::detect_outliers(&df)?;
//! ```

pub mod ai;
pub mod analysis;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod types;

// Re-exports for convenient access
pub use classifier::{
    CALL_FAILURE_CONFIDENCE, DEFAULT_INTENT, IntentClassifier, PARSE_FAILURE_CONFIDENCE,
};
pub use error::{NlqError, Result, ResultExt};
pub use extractor::EntityExtractor;
pub use types::{
    AggregateFunction, Aggregation, CategoricalColumnStats, DatasetSummary, FilterCondition,
    FilterOperator, Intent, IntentResult, NumericColumnStats, OverallStats, QueryEntities,
    TimeRange, ValueCount,
};
