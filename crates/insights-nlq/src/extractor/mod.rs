//! Entity extraction: regex rules with a remote-model fallback.
//!
//! The extractor turns a raw query string into a [`QueryEntities`] record.
//! Four ordered regex rules run first; only when every field comes back
//! empty is the (optional) completion provider asked to fill the record.
//! Extraction never fails: any enrichment problem leaves the regex result
//! untouched.

mod enrichment;
mod rules;

use crate::ai::CompletionProvider;
use crate::types::QueryEntities;
use tracing::debug;

/// Extracts structured entities from natural-language data queries.
///
/// # Example
///
/// ```rust,ignore
/// use insights_nlq::EntityExtractor;
/// use insights_nlq::ai::GeminiProvider;
///
/// // Regex-only extraction
/// let entities = EntityExtractor::new().extract("show sales from orders");
///
/// // With model enrichment for queries the rules cannot parse
/// let provider = GeminiProvider::new(api_key)?;
/// let entities = EntityExtractor::with_provider(&provider)
///     .extract("which products kept customers coming back");
/// ```
#[derive(Default)]
pub struct EntityExtractor<'a> {
    provider: Option<&'a dyn CompletionProvider>,
}

impl<'a> EntityExtractor<'a> {
    /// Create a regex-only extractor.
    pub fn new() -> Self {
        Self { provider: None }
    }

    /// Create an extractor that falls back to the given completion provider
    /// when the regex rules find nothing.
    pub fn with_provider(provider: &'a dyn CompletionProvider) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Extract entities from a query. Never fails.
    pub fn extract(&self, query: &str) -> QueryEntities {
        let mut entities = QueryEntities {
            columns: rules::extract_columns(query),
            filters: rules::extract_filters(query),
            aggregations: rules::extract_aggregations(query),
            time_range: rules::extract_time_range(query),
            ..Default::default()
        };

        // The fallback is all-or-nothing: a single populated field, even just
        // a time range, suppresses it.
        if entities.is_empty()
            && let Some(provider) = self.provider
        {
            debug!("Regex rules found nothing, asking {} for entities", provider.name());
            enrichment::enrich(&mut entities, provider, query);
        }

        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NlqError, Result};
    use crate::types::{AggregateFunction, FilterOperator};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider returning a canned reply, counting how often it is called.
    struct CannedProvider {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CompletionProvider for CannedProvider {
        fn complete(&self, _prompt: &str, _context: Option<&str>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct FailingProvider;

    impl CompletionProvider for FailingProvider {
        fn complete(&self, _prompt: &str, _context: Option<&str>) -> Result<String> {
            Err(NlqError::RemoteCallFailed("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_extract_combined_query() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("show sales, profit from orders where region = 'west'");

        assert_eq!(entities.columns, vec!["sales", "profit"]);
        assert_eq!(entities.filters.len(), 1);
        assert_eq!(entities.filters[0].operator, FilterOperator::Eq);
        assert_eq!(entities.filters[0].value, "west");
        assert!(entities.time_range.is_none());
    }

    #[test]
    fn test_extract_columns_and_time_range_together() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("display revenue from january to march");

        assert_eq!(entities.columns, vec!["revenue"]);
        let range = entities.time_range.unwrap();
        assert_eq!(range.start, "january");
        assert_eq!(range.end, "march");
    }

    #[test]
    fn test_overlapping_matches_not_deduplicated() {
        // "average" appears both as a captured column and as an aggregation
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("show the average of revenue");

        assert_eq!(entities.columns, vec!["average"]);
        assert_eq!(entities.aggregations.len(), 1);
        assert_eq!(entities.aggregations[0].function, AggregateFunction::Average);
        assert_eq!(entities.aggregations[0].column, "revenue");
    }

    #[test]
    fn test_fallback_fills_from_canned_json() {
        let provider = CannedProvider::new(r#"{"columns": ["sales"]}"#);
        let extractor = EntityExtractor::with_provider(&provider);

        let entities = extractor.extract("which figures mattered most last quarter");
        assert_eq!(entities.columns, vec!["sales"]);
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_fallback_malformed_reply_keeps_empty_record() {
        let provider = CannedProvider::new("not json at all");
        let extractor = EntityExtractor::with_provider(&provider);

        let entities = extractor.extract("which figures mattered most last quarter");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_fallback_suppressed_by_single_populated_field() {
        let provider = CannedProvider::new(r#"{"columns": ["sales"]}"#);
        let extractor = EntityExtractor::with_provider(&provider);

        // Time range populates, so the provider must not be called at all
        let entities = extractor.extract("numbers from january to march");
        assert!(entities.time_range.is_some());
        assert!(entities.columns.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_provider_failure_falls_back_silently() {
        let extractor = EntityExtractor::with_provider(&FailingProvider);
        let entities = extractor.extract("which figures mattered most last quarter");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let provider = CannedProvider::new(r#"{"columns": ["sales"], "limit": 10}"#);
        let extractor = EntityExtractor::with_provider(&provider);
        let query = "which figures mattered most last quarter";

        let first = extractor.extract(query);
        let second = extractor.extract(query);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_provider_keeps_empty_record() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("which figures mattered most last quarter");
        assert!(entities.is_empty());
    }
}
