//! IQR-based outlier detection for numeric columns.

use std::collections::BTreeMap;

use polars::prelude::*;

use super::{is_numeric_dtype, quantile_sorted};
use crate::error::Result;

/// Row indices of outlying values per numeric column.
///
/// A value is an outlier when it lies outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`
/// computed over the column's non-null values. Null rows are never flagged,
/// but the reported indices count every row of the dataframe. Every numeric
/// column gets an entry, even when no outliers were found; non-numeric
/// columns are skipped entirely.
pub fn detect_outliers(df: &DataFrame) -> Result<BTreeMap<String, Vec<usize>>> {
    let mut outliers = BTreeMap::new();

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            continue;
        }

        let casted = series.cast(&DataType::Float64)?;
        let chunked = casted.f64()?;
        let mut sorted: Vec<f64> = chunked.into_iter().flatten().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let indices = if sorted.is_empty() {
            Vec::new()
        } else {
            let q1 = quantile_sorted(&sorted, 0.25);
            let q3 = quantile_sorted(&sorted, 0.75);
            let iqr = q3 - q1;
            let lower_bound = q1 - 1.5 * iqr;
            let upper_bound = q3 + 1.5 * iqr;

            chunked
                .into_iter()
                .enumerate()
                .filter_map(|(index, value)| {
                    let value = value?;
                    (value < lower_bound || value > upper_bound).then_some(index)
                })
                .collect()
        };

        outliers.insert(series.name().to_string(), indices);
    }

    Ok(outliers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_extreme_value() {
        let df = df!("value" => [1.0, 1.0, 1.0, 2.0, 100.0]).unwrap();
        let outliers = detect_outliers(&df).unwrap();
        assert_eq!(outliers["value"], vec![4]);
    }

    #[test]
    fn test_null_rows_never_flagged_indices_count_all_rows() {
        let df = df!("value" => [Some(1.0), None, Some(1.0), Some(1.0), Some(2.0), Some(100.0)])
            .unwrap();
        let outliers = detect_outliers(&df).unwrap();
        // The extreme value sits at row 5 because the null row still counts
        assert_eq!(outliers["value"], vec![5]);
    }

    #[test]
    fn test_clean_column_gets_empty_entry() {
        let df = df!("value" => [1.0, 2.0, 3.0, 4.0]).unwrap();
        let outliers = detect_outliers(&df).unwrap();
        assert_eq!(outliers["value"], Vec::<usize>::new());
    }

    #[test]
    fn test_all_null_column_gets_empty_entry() {
        let df = df!("value" => [None::<f64>, None, None]).unwrap();
        let outliers = detect_outliers(&df).unwrap();
        assert!(outliers.contains_key("value"));
        assert!(outliers["value"].is_empty());
    }

    #[test]
    fn test_non_numeric_columns_skipped() {
        let df = df!(
            "value" => [1.0, 2.0],
            "label" => ["a", "b"],
        )
        .unwrap();
        let outliers = detect_outliers(&df).unwrap();
        assert_eq!(outliers.len(), 1);
        assert!(!outliers.contains_key("label"));
    }

    #[test]
    fn test_integer_column_handled() {
        let df = df!("count" => [10i64, 11, 12, 10, 11, 500]).unwrap();
        let outliers = detect_outliers(&df).unwrap();
        assert_eq!(outliers["count"], vec![5]);
    }
}
