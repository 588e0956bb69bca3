//! Descriptive analysis of tabular datasets.
//!
//! Two entry points: [`summarize`] builds a [`crate::types::DatasetSummary`]
//! with per-column statistics, and [`detect_outliers`] flags rows with
//! IQR-extreme values in numeric columns. Both operate on a borrowed
//! [`polars::prelude::DataFrame`] and never mutate it.

mod outliers;
mod summary;

pub use outliers::detect_outliers;
pub use summary::summarize;

use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is treated as categorical for summary purposes.
#[inline]
pub(crate) fn is_categorical_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Linear-interpolation quantile over an already-sorted slice.
pub(crate) fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}
