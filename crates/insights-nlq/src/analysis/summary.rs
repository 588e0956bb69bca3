//! Per-column and dataset-level summary statistics.

use std::collections::HashMap;

use chrono::Utc;
use polars::prelude::*;

use super::{is_categorical_dtype, is_numeric_dtype, quantile_sorted};
use crate::error::Result;
use crate::types::{
    CategoricalColumnStats, DatasetSummary, NumericColumnStats, OverallStats, ValueCount,
};

/// How many distinct values a categorical summary reports.
const TOP_VALUE_COUNT: usize = 10;

/// Build a full descriptive summary of a dataframe.
///
/// Numeric columns get mean/median/std/min/max plus missing counts;
/// string columns get cardinality and their most frequent values. Columns
/// whose values are all null are counted in the overall totals but produce
/// no per-column entry. Other dtypes (booleans, datetimes) only contribute
/// to the overall row/column counts.
pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    let mut numeric_count = 0usize;
    let mut categorical_count = 0usize;

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if is_numeric_dtype(series.dtype()) {
            numeric_count += 1;
            if let Some(stats) = numeric_column_stats(series)? {
                numeric.push(stats);
            }
        } else if is_categorical_dtype(series.dtype()) {
            categorical_count += 1;
            if let Some(stats) = categorical_column_stats(series)? {
                categorical.push(stats);
            }
        }
    }

    Ok(DatasetSummary {
        overall: OverallStats {
            rows: df.height(),
            columns: df.width(),
            numeric_columns: numeric_count,
            categorical_columns: categorical_count,
            estimated_size_bytes: df.estimated_size(),
        },
        numeric,
        categorical,
        generated_at: Utc::now(),
    })
}

/// Sample statistics over the non-null values of a numeric column.
fn numeric_column_stats(series: &Series) -> Result<Option<NumericColumnStats>> {
    let casted = series.cast(&DataType::Float64)?;
    let values: Vec<f64> = casted.f64()?.into_iter().flatten().collect();
    if values.is_empty() {
        return Ok(None);
    }

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    // Sample variance (n - 1 denominator)
    let variance = if n > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)
    } else {
        0.0
    };

    Ok(Some(NumericColumnStats {
        name: series.name().to_string(),
        mean,
        median: quantile_sorted(&sorted, 0.5),
        std: variance.sqrt(),
        min: sorted.first().copied().unwrap_or(0.0),
        max: sorted.last().copied().unwrap_or(0.0),
        missing: series.null_count(),
        missing_percent: missing_percent(series),
    }))
}

/// Cardinality and top values over the non-null values of a string column.
fn categorical_column_stats(series: &Series) -> Result<Option<CategoricalColumnStats>> {
    let casted = series.cast(&DataType::String)?;
    let chunked = casted.str()?;

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in chunked.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return Ok(None);
    }

    let unique_values = counts.len();
    let mut top_values: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect();
    // Descending by count; ties broken by value for stable output
    top_values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    top_values.truncate(TOP_VALUE_COUNT);

    Ok(Some(CategoricalColumnStats {
        name: series.name().to_string(),
        unique_values,
        missing: series.null_count(),
        missing_percent: missing_percent(series),
        top_values,
    }))
}

fn missing_percent(series: &Series) -> f64 {
    if series.is_empty() {
        0.0
    } else {
        (series.null_count() as f64 / series.len() as f64) * 100.0
    }
}
