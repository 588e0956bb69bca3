//! Intent classification for natural-language data queries.
//!
//! The classifier is a thin prompt-and-parse layer over a
//! [`CompletionProvider`]: the model is asked to pick one label from a fixed
//! set and report a confidence, formatted as `label|confidence`. Classification
//! never fails; malformed replies and call failures degrade to documented
//! defaults instead.

use crate::ai::CompletionProvider;
use crate::types::{Intent, IntentResult};
use tracing::{debug, warn};

/// Label used whenever the model gives no usable answer.
pub const DEFAULT_INTENT: Intent = Intent::DataExploration;

/// Confidence reported when the reply arrived but could not be parsed.
pub const PARSE_FAILURE_CONFIDENCE: f64 = 0.7;

/// Confidence reported when the completion call itself failed.
pub const CALL_FAILURE_CONFIDENCE: f64 = 0.5;

/// Classifies queries into one of the fixed [`Intent`] labels.
///
/// # Example
///
/// ```rust,ignore
/// use insights_nlq::IntentClassifier;
/// use insights_nlq::ai::GeminiProvider;
///
/// let provider = GeminiProvider::new(api_key)?;
/// let result = IntentClassifier::new(&provider).classify("show sales by region");
/// println!("{} ({:.2})", result.intent, result.confidence);
/// ```
pub struct IntentClassifier<'a> {
    provider: &'a dyn CompletionProvider,
}

impl<'a> IntentClassifier<'a> {
    pub fn new(provider: &'a dyn CompletionProvider) -> Self {
        Self { provider }
    }

    /// Classify a query. Never fails.
    ///
    /// A reply that does not parse as `label|confidence` yields
    /// ([`DEFAULT_INTENT`], [`PARSE_FAILURE_CONFIDENCE`]); a failed call
    /// yields ([`DEFAULT_INTENT`], [`CALL_FAILURE_CONFIDENCE`]). The
    /// confidence is taken from the model verbatim and is not clamped.
    pub fn classify(&self, query: &str) -> IntentResult {
        let prompt = build_classification_prompt(query);

        match self.provider.complete(&prompt, None) {
            Ok(reply) => parse_classification_reply(&reply),
            Err(e) => {
                warn!("Intent classification call failed, using default: {}", e);
                IntentResult::new(DEFAULT_INTENT, CALL_FAILURE_CONFIDENCE)
            }
        }
    }
}

fn build_classification_prompt(query: &str) -> String {
    let labels = Intent::ALL.map(|intent| intent.as_str()).join(", ");
    format!(
        "Classify the intent of this data query: \"{query}\"\n\
         Choose exactly one of: {labels}\n\
         Respond with only the label and a confidence between 0 and 1, \
         separated by a pipe, for example: trend_analysis|0.85"
    )
}

/// Parse a `label|confidence` reply.
///
/// The split happens at the first pipe only, so extra pipes corrupt the
/// confidence half and fall back to the parse-failure default rather than
/// the label.
fn parse_classification_reply(reply: &str) -> IntentResult {
    let parsed = reply
        .trim()
        .split_once('|')
        .and_then(|(label, confidence)| {
            let intent = Intent::parse(label.trim())?;
            let confidence = confidence.trim().parse::<f64>().ok()?;
            Some(IntentResult::new(intent, confidence))
        });

    match parsed {
        Some(result) => result,
        None => {
            debug!("Could not parse classification reply {:?}, using default", reply);
            IntentResult::new(DEFAULT_INTENT, PARSE_FAILURE_CONFIDENCE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NlqError, Result};
    use pretty_assertions::assert_eq;

    struct CannedProvider(String);

    impl CompletionProvider for CannedProvider {
        fn complete(&self, _prompt: &str, _context: Option<&str>) -> Result<String> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct FailingProvider;

    impl CompletionProvider for FailingProvider {
        fn complete(&self, _prompt: &str, _context: Option<&str>) -> Result<String> {
            Err(NlqError::RemoteCallFailed("service unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn classify_reply(reply: &str) -> IntentResult {
        let provider = CannedProvider(reply.to_string());
        IntentClassifier::new(&provider).classify("show sales")
    }

    // ==================== reply parsing tests ====================

    #[test]
    fn test_well_formed_reply() {
        let result = classify_reply("trend_analysis|0.85");
        assert_eq!(result.intent, Intent::TrendAnalysis);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_reply_whitespace_tolerated() {
        let result = classify_reply("  comparison | 0.9 \n");
        assert_eq!(result.intent, Intent::Comparison);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_unknown_label_defaults() {
        let result = classify_reply("exploration|0.9");
        assert_eq!(result.intent, DEFAULT_INTENT);
        assert_eq!(result.confidence, PARSE_FAILURE_CONFIDENCE);
    }

    #[test]
    fn test_missing_pipe_defaults() {
        let result = classify_reply("data_exploration 0.9");
        assert_eq!(result.intent, DEFAULT_INTENT);
        assert_eq!(result.confidence, PARSE_FAILURE_CONFIDENCE);
    }

    #[test]
    fn test_unparseable_confidence_defaults() {
        let result = classify_reply("prediction|high");
        assert_eq!(result.intent, DEFAULT_INTENT);
        assert_eq!(result.confidence, PARSE_FAILURE_CONFIDENCE);
    }

    #[test]
    fn test_extra_pipe_corrupts_confidence() {
        // Split at the first pipe only: "0.9|extra" is not a number
        let result = classify_reply("prediction|0.9|extra");
        assert_eq!(result.intent, DEFAULT_INTENT);
        assert_eq!(result.confidence, PARSE_FAILURE_CONFIDENCE);
    }

    #[test]
    fn test_confidence_not_clamped() {
        let result = classify_reply("comparison|1.7");
        assert_eq!(result.intent, Intent::Comparison);
        assert_eq!(result.confidence, 1.7);

        let result = classify_reply("comparison|-0.2");
        assert_eq!(result.confidence, -0.2);
    }

    // ==================== failure mode tests ====================

    #[test]
    fn test_call_failure_uses_lower_confidence() {
        let result = IntentClassifier::new(&FailingProvider).classify("show sales");
        assert_eq!(result.intent, DEFAULT_INTENT);
        assert_eq!(result.confidence, CALL_FAILURE_CONFIDENCE);
    }

    // ==================== prompt tests ====================

    #[test]
    fn test_prompt_lists_all_labels_and_query() {
        let prompt = build_classification_prompt("show sales by region");
        assert!(prompt.contains("show sales by region"));
        for intent in Intent::ALL {
            assert!(prompt.contains(intent.as_str()), "missing {intent}");
        }
    }
}
