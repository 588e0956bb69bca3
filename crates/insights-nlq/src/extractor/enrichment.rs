//! Model-enrichment pass for queries the regex rules could not parse.
//!
//! Triggered only when the regex phase produced a fully empty record. The
//! remote model is asked for a strict JSON object; a reply that deviates from
//! the expected shape is discarded wholesale and the empty regex result
//! stands. Nothing in this module ever surfaces an error to the caller.

use crate::ai::CompletionProvider;
use crate::types::{Aggregation, FilterCondition, QueryEntities, TimeRange};
use serde::Deserialize;
use tracing::{debug, warn};

/// Shape the remote model is asked to produce. Parsed strictly: a field of
/// the wrong shape fails the whole reply.
#[derive(Debug, Default, Deserialize)]
struct RemoteEntities {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    filters: Vec<FilterCondition>,
    #[serde(default)]
    aggregations: Vec<Aggregation>,
    #[serde(default)]
    time_range: Option<TimeRange>,
    #[serde(default)]
    limit: Option<serde_json::Value>,
    #[serde(default)]
    sort: Option<serde_json::Value>,
}

pub(crate) fn build_enrichment_prompt(query: &str) -> String {
    format!(
        "Extract structured information from this data query: \"{query}\"\n\
         Return a JSON object with these fields:\n\
         - columns: list of column names mentioned\n\
         - filters: list of filter conditions (column, operator, value)\n\
         - aggregations: list of aggregation functions and their columns\n\
         - time_range: any time period mentioned (start and end)\n\
         - limit: any result limit mentioned\n\
         - sort: any sorting criteria mentioned\n\n\
         Format your response as valid JSON only, no explanations."
    )
}

/// Ask the remote model to fill in fields the regex phase left empty.
///
/// Only fields that are still empty/unset are written; a regex-produced value
/// is never overwritten. Call failures and malformed replies are logged and
/// swallowed.
pub(crate) fn enrich(
    entities: &mut QueryEntities,
    provider: &dyn CompletionProvider,
    query: &str,
) {
    let prompt = build_enrichment_prompt(query);

    let reply = match provider.complete(&prompt, None) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Model enrichment call failed, keeping regex results: {}", e);
            return;
        }
    };

    match parse_remote_entities(&reply) {
        Some(remote) => merge_remote_entities(entities, remote),
        None => {
            debug!("Model enrichment reply was not valid JSON, keeping regex results");
        }
    }
}

/// Parse the model reply, tolerating Markdown code fences around the JSON.
fn parse_remote_entities(reply: &str) -> Option<RemoteEntities> {
    serde_json::from_str(strip_code_fences(reply)).ok()
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Copy every non-empty remote field into a still-empty target field.
fn merge_remote_entities(entities: &mut QueryEntities, remote: RemoteEntities) {
    if entities.columns.is_empty() && !remote.columns.is_empty() {
        entities.columns = remote.columns;
    }
    if entities.filters.is_empty() && !remote.filters.is_empty() {
        entities.filters = remote.filters;
    }
    if entities.aggregations.is_empty() && !remote.aggregations.is_empty() {
        entities.aggregations = remote.aggregations;
    }
    if entities.time_range.is_none() {
        entities.time_range = remote.time_range;
    }
    if entities.limit.is_none() {
        entities.limit = remote.limit.filter(|v| !v.is_null());
    }
    if entities.sort.is_none() {
        entities.sort = remote.sort.filter(|v| !v.is_null());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AggregateFunction, FilterOperator};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_remote_reply() {
        let reply = r#"{
            "columns": ["sales", "region"],
            "filters": [{"column": "year", "operator": ">", "value": "2020"}],
            "aggregations": [{"function": "sum", "column": "sales"}],
            "time_range": {"start": "january", "end": "june"},
            "limit": 10,
            "sort": "sales desc"
        }"#;

        let remote = parse_remote_entities(reply).unwrap();
        assert_eq!(remote.columns, vec!["sales", "region"]);
        assert_eq!(remote.filters[0].operator, FilterOperator::Gt);
        assert_eq!(remote.aggregations[0].function, AggregateFunction::Sum);
        assert_eq!(remote.time_range.unwrap().start, "january");
        assert_eq!(remote.limit, Some(serde_json::json!(10)));
    }

    #[test]
    fn test_parse_partial_reply_defaults_missing_fields() {
        let remote = parse_remote_entities(r#"{"columns": ["sales"]}"#).unwrap();
        assert_eq!(remote.columns, vec!["sales"]);
        assert!(remote.filters.is_empty());
        assert!(remote.time_range.is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        // columns must be a list of strings
        assert!(parse_remote_entities(r#"{"columns": "sales"}"#).is_none());
        // operator must come from the fixed set
        assert!(
            parse_remote_entities(
                r#"{"filters": [{"column": "a", "operator": "like", "value": "b"}]}"#
            )
            .is_none()
        );
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_remote_entities("Here are your entities!").is_none());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```json\n{\"columns\": []}\n```"),
            "{\"columns\": []}"
        );
        assert_eq!(strip_code_fences("{\"columns\": []}"), "{\"columns\": []}");
    }

    #[test]
    fn test_merge_never_overwrites_existing_field() {
        let mut entities = QueryEntities {
            columns: vec!["profit".to_string()],
            ..Default::default()
        };
        let remote = RemoteEntities {
            columns: vec!["sales".to_string()],
            limit: Some(serde_json::json!(5)),
            ..Default::default()
        };

        merge_remote_entities(&mut entities, remote);
        assert_eq!(entities.columns, vec!["profit"]);
        assert_eq!(entities.limit, Some(serde_json::json!(5)));
    }

    #[test]
    fn test_merge_ignores_null_limit_and_sort() {
        let mut entities = QueryEntities::default();
        let remote = RemoteEntities {
            limit: Some(serde_json::Value::Null),
            sort: Some(serde_json::Value::Null),
            ..Default::default()
        };

        merge_remote_entities(&mut entities, remote);
        assert!(entities.is_empty());
    }
}
