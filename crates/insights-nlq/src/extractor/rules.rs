//! Regex phase of entity extraction.
//!
//! Four independent, case-insensitive rules run unconditionally over the
//! query text. Each rule is best-effort: a rule that finds nothing leaves its
//! field empty and the remaining rules still run. Overlapping matches across
//! rules are kept as-is; a column name may legitimately appear both in the
//! column list and inside an aggregation clause.

use crate::types::{Aggregation, AggregateFunction, FilterCondition, FilterOperator, TimeRange};
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading verb phrase, optional "the", then a column list captured lazily up
/// to a word-bounded boundary keyword or end of string.
static COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:show|display|what is|what are|analyze|compare)(?:\s+the)?\s+([A-Za-z0-9_\s,]+?)(?:\s+(?:from|in|of|for|by|where)\b|$)",
    )
    .expect("column pattern is valid")
});

/// Head of a `where <column> <operator>` clause. Multi-character operators
/// are listed before their single-character prefixes. The value run is
/// sliced out separately so that one clause's value cannot swallow the next
/// `where` head.
static FILTER_HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)where\s+([A-Za-z0-9_]+)\s+(is|>=|<=|!=|=|>|<)\s+")
        .expect("filter pattern is valid")
});

/// Every `<agg-word> [of|for]? <column>` occurrence.
static AGGREGATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(average|avg|sum|total|count|min|max|mean|median)\s+(?:(?:of|for)\s+)?([A-Za-z0-9_\s]+)",
    )
    .expect("aggregation pattern is valid")
});

/// `(from|between) <start> (to|and) <end>`; only the first match is used.
static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:from|between)\s+([A-Za-z0-9_\s\-/]+)\s+(?:to|and)\s+([A-Za-z0-9_\s\-/]+)")
        .expect("time range pattern is valid")
});

/// Extract the column list from the leading verb phrase, split on commas.
pub(crate) fn extract_columns(query: &str) -> Vec<String> {
    let Some(captures) = COLUMN_RE.captures(query) else {
        return Vec::new();
    };

    captures[1]
        .split(',')
        .map(|col| col.trim().to_string())
        .collect()
}

/// Extract every `where` condition in order of appearance.
///
/// Each clause's value is the run of word characters, spaces, and quotes
/// following the operator, cut short where the next `where` head begins. A
/// connective `and`/`or` dangling right before the next clause is dropped
/// from the value.
pub(crate) fn extract_filters(query: &str) -> Vec<FilterCondition> {
    let heads: Vec<regex::Captures<'_>> = FILTER_HEAD_RE.captures_iter(query).collect();

    let mut filters = Vec::with_capacity(heads.len());
    for (i, captures) in heads.iter().enumerate() {
        let Some(operator) = FilterOperator::parse(captures[2].trim()) else {
            continue;
        };

        let value_start = captures.get(0).map_or(0, |m| m.end());
        let value_end = heads
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(query.len(), |m| m.start());

        let mut value = leading_value_run(&query[value_start..value_end]).trim();
        if heads.len() > i + 1 {
            value = strip_trailing_connective(value);
        }
        if value.is_empty() {
            continue;
        }

        filters.push(FilterCondition {
            column: captures[1].trim().to_string(),
            operator,
            value: value.trim_matches(['\'', '"']).to_string(),
        });
    }
    filters
}

/// Leading run of characters allowed in a filter value.
fn leading_value_run(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || c == '\'' || c == '"'))
        .unwrap_or(text.len());
    &text[..end]
}

/// Drop a dangling `and`/`or` left over before the next `where` clause.
fn strip_trailing_connective(value: &str) -> &str {
    for connective in ["and", "or"] {
        if let Some(rest) = value
            .strip_suffix(connective)
            .or_else(|| value.strip_suffix(&connective.to_uppercase()))
            && rest.ends_with(char::is_whitespace)
        {
            return rest.trim_end();
        }
    }
    value
}

/// Extract every aggregation clause in order of appearance.
pub(crate) fn extract_aggregations(query: &str) -> Vec<Aggregation> {
    AGGREGATION_RE
        .captures_iter(query)
        .filter_map(|captures| {
            let function = AggregateFunction::parse(&captures[1].to_lowercase())?;
            Some(Aggregation {
                function,
                column: captures[2].trim().to_string(),
            })
        })
        .collect()
}

/// Extract the first time range mention; the date text stays unparsed.
pub(crate) fn extract_time_range(query: &str) -> Option<TimeRange> {
    let captures = TIME_RANGE_RE.captures(query)?;
    Some(TimeRange {
        start: captures[1].trim().to_string(),
        end: captures[2].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ==================== extract_columns tests ====================

    #[test]
    fn test_columns_single() {
        assert_eq!(extract_columns("show sales from orders"), vec!["sales"]);
    }

    #[test]
    fn test_columns_comma_list_trimmed_in_order() {
        assert_eq!(
            extract_columns("display revenue, profit , customers from q3"),
            vec!["revenue", "profit", "customers"]
        );
    }

    #[test]
    fn test_columns_optional_the() {
        assert_eq!(extract_columns("show the profit by region"), vec!["profit"]);
    }

    #[test]
    fn test_columns_case_insensitive_verb() {
        assert_eq!(extract_columns("What are sales in Q2"), vec!["sales"]);
    }

    #[test]
    fn test_columns_runs_to_end_without_boundary() {
        assert_eq!(
            extract_columns("analyze customer churn"),
            vec!["customer churn"]
        );
    }

    #[test]
    fn test_columns_boundary_requires_word_break() {
        // "information" must not be cut at its embedded "in"
        assert_eq!(
            extract_columns("show information from logs"),
            vec!["information"]
        );
    }

    #[test]
    fn test_columns_no_verb_phrase() {
        assert!(extract_columns("count of orders").is_empty());
    }

    // ==================== extract_filters tests ====================

    #[test]
    fn test_filters_two_clauses_in_order_quotes_stripped() {
        let filters =
            extract_filters("show sales where region = 'north' and where amount > 100");
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].column, "region");
        assert_eq!(filters[0].operator, FilterOperator::Eq);
        assert_eq!(filters[0].value, "north");
        assert_eq!(filters[1].column, "amount");
        assert_eq!(filters[1].operator, FilterOperator::Gt);
    }

    #[test]
    fn test_filters_multichar_operator() {
        let filters = extract_filters("where score >= 80");
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].operator, FilterOperator::Ge);
        assert_eq!(filters[0].value, "80");
    }

    #[test]
    fn test_filters_is_operator_case_insensitive() {
        let filters = extract_filters("where status IS active");
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].operator, FilterOperator::Is);
        assert_eq!(filters[0].value, "active");
    }

    #[test]
    fn test_filters_double_quoted_value() {
        let filters = extract_filters(r#"where city != "new york""#);
        assert_eq!(filters[0].operator, FilterOperator::Ne);
        assert_eq!(filters[0].value, "new york");
    }

    #[test]
    fn test_filters_none() {
        assert!(extract_filters("show sales").is_empty());
    }

    // ==================== extract_aggregations tests ====================

    #[test]
    fn test_aggregation_average_of() {
        let aggs = extract_aggregations("average of revenue");
        assert_eq!(
            aggs,
            vec![Aggregation {
                function: AggregateFunction::Average,
                column: "revenue".to_string()
            }]
        );
    }

    #[test]
    fn test_aggregation_connector_optional() {
        let aggs = extract_aggregations("sum revenue");
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].function, AggregateFunction::Sum);
        assert_eq!(aggs[0].column, "revenue");
    }

    #[test]
    fn test_aggregation_function_lowercased() {
        let aggs = extract_aggregations("MAX of price");
        assert_eq!(aggs[0].function, AggregateFunction::Max);
    }

    #[test]
    fn test_aggregation_synonyms_kept_verbatim() {
        let aggs = extract_aggregations("avg of latency");
        assert_eq!(aggs[0].function, AggregateFunction::Avg);
    }

    #[test]
    fn test_aggregation_column_is_word_space_run() {
        let aggs = extract_aggregations("median of order value");
        assert_eq!(aggs[0].column, "order value");
    }

    // ==================== extract_time_range tests ====================

    #[test]
    fn test_time_range_from_to() {
        let range = extract_time_range("sales from january to march").unwrap();
        assert_eq!(range.start, "january");
        assert_eq!(range.end, "march");
    }

    #[test]
    fn test_time_range_between_and() {
        let range = extract_time_range("between 2023-01-01 and 2023-06-30").unwrap();
        assert_eq!(range.start, "2023-01-01");
        assert_eq!(range.end, "2023-06-30");
    }

    #[test]
    fn test_time_range_dates_stay_raw() {
        let range = extract_time_range("from 01/02/2024 to 28/02/2024").unwrap();
        assert_eq!(range.start, "01/02/2024");
        assert_eq!(range.end, "28/02/2024");
    }

    #[test]
    fn test_time_range_absent() {
        assert!(extract_time_range("show sales").is_none());
    }
}
