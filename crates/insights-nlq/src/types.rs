use serde::{Deserialize, Serialize};

// ============================================================================
// Query understanding types
// ============================================================================

/// Comparison operator accepted in a `where` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "!=")]
    Ne,
}

impl FilterOperator {
    /// Parse an operator token as it appears in a query (`is` is matched
    /// case-insensitively, symbols verbatim).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Eq),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            "!=" => Some(Self::Ne),
            _ if token.eq_ignore_ascii_case("is") => Some(Self::Is),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Ne => "!=",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation keyword recognized in a query.
///
/// Synonyms (`average`/`avg`/`mean`, `sum`/`total`) are deliberately kept as
/// distinct variants so the record preserves the exact word the user wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Average,
    Avg,
    Sum,
    Total,
    Count,
    Min,
    Max,
    Mean,
    Median,
}

impl AggregateFunction {
    /// Parse a lower-cased aggregation keyword.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "average" => Some(Self::Average),
            "avg" => Some(Self::Avg),
            "sum" => Some(Self::Sum),
            "total" => Some(Self::Total),
            "count" => Some(Self::Count),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "mean" => Some(Self::Mean),
            "median" => Some(Self::Median),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Avg => "avg",
            Self::Sum => "sum",
            Self::Total => "total",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::Mean => "mean",
            Self::Median => "median",
        }
    }
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `where <column> <operator> <value>` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

/// An aggregation request such as `average of revenue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub function: AggregateFunction,
    pub column: String,
}

/// Raw, unparsed time range text extracted from a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Structured entities extracted from a natural-language data query.
///
/// All fields start empty; the model-enrichment pass only fills fields that
/// the regex rules left empty and never overwrites an existing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryEntities {
    pub columns: Vec<String>,
    pub filters: Vec<FilterCondition>,
    pub aggregations: Vec<Aggregation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    /// Result limit, populated only by the model-enrichment pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<serde_json::Value>,
    /// Sort criteria, populated only by the model-enrichment pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<serde_json::Value>,
}

impl QueryEntities {
    /// True when every field is still in its default empty/unset state.
    ///
    /// The model-enrichment pass triggers only on a fully empty record.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
            && self.filters.is_empty()
            && self.aggregations.is_empty()
            && self.time_range.is_none()
            && self.limit.is_none()
            && self.sort.is_none()
    }
}

/// Fixed label set for query intent classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DataExploration,
    StatisticalAnalysis,
    TrendAnalysis,
    Comparison,
    Prediction,
    AnomalyDetection,
    DataFiltering,
    DataAggregation,
}

impl Intent {
    /// All labels in prompt order.
    pub const ALL: [Intent; 8] = [
        Intent::DataExploration,
        Intent::StatisticalAnalysis,
        Intent::TrendAnalysis,
        Intent::Comparison,
        Intent::Prediction,
        Intent::AnomalyDetection,
        Intent::DataFiltering,
        Intent::DataAggregation,
    ];

    /// Parse a label exactly as it appears in the prompt's label set.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "data_exploration" => Some(Self::DataExploration),
            "statistical_analysis" => Some(Self::StatisticalAnalysis),
            "trend_analysis" => Some(Self::TrendAnalysis),
            "comparison" => Some(Self::Comparison),
            "prediction" => Some(Self::Prediction),
            "anomaly_detection" => Some(Self::AnomalyDetection),
            "data_filtering" => Some(Self::DataFiltering),
            "data_aggregation" => Some(Self::DataAggregation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataExploration => "data_exploration",
            Self::StatisticalAnalysis => "statistical_analysis",
            Self::TrendAnalysis => "trend_analysis",
            Self::Comparison => "comparison",
            Self::Prediction => "prediction",
            Self::AnomalyDetection => "anomaly_detection",
            Self::DataFiltering => "data_filtering",
            Self::DataAggregation => "data_aggregation",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification outcome: one label plus the model's confidence.
///
/// Confidence is passed through from the model verbatim and is not clamped
/// to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f64,
}

impl IntentResult {
    pub fn new(intent: Intent, confidence: f64) -> Self {
        Self { intent, confidence }
    }
}

// ============================================================================
// Descriptive analysis types
// ============================================================================

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnStats {
    pub name: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub missing: usize,
    pub missing_percent: f64,
}

/// A distinct value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// Summary statistics for a string/categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumnStats {
    pub name: String,
    pub unique_values: usize,
    pub missing: usize,
    pub missing_percent: f64,
    /// Top 10 values by frequency, descending.
    pub top_values: Vec<ValueCount>,
}

/// Dataset-level counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub estimated_size_bytes: usize,
}

/// Full descriptive summary of a dataframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub overall: OverallStats,
    pub numeric: Vec<NumericColumnStats>,
    pub categorical: Vec<CategoricalColumnStats>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
