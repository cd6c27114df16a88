//! Shared utilities for the track-analytics pipeline.
//!
//! Dtype predicates, null-fill helpers and column extraction used by the
//! cleaner, the transformer and the reporting stages.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// True for every integer and float dtype.
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
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

/// True for the boolean dtype.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

/// True for string-like dtypes.
#[inline]
pub fn is_string_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Names of all numeric columns, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of all string columns, in frame order.
pub fn string_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_string_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Replace every null in a numeric Series, casting the result to f64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let casted = series.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    let values: Vec<f64> = ca
        .into_iter()
        .map(|opt| opt.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Replace every null in a string Series with a fixed literal.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let ca = series.str()?;
    let values: Vec<String> = ca
        .into_iter()
        .map(|opt| opt.map_or_else(|| fill_value.to_string(), str::to_string))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Extract a column as non-null f64 values. Booleans become 0.0/1.0.
///
/// Nulls are dropped, so callers that require row alignment must check
/// `null_count()` first.
pub fn column_as_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let series = df.column(name)?.as_materialized_series();
    let casted = series.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().flatten().collect())
}

/// Render a cell as a plain string label. Integer-valued floats drop the
/// fractional part so `1.0` and `1` name the same category.
pub(crate) fn value_label(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => "null".to_string(),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => match other.try_extract::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", v as i64),
            Ok(v) => format!("{v}"),
            Err(_) => format!("{other}"),
        },
    }
}

/// Every cell of a column rendered through [`value_label`], in row order.
pub(crate) fn column_labels(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let series = df.column(name)?.as_materialized_series();
    let mut labels = Vec::with_capacity(series.len());
    for idx in 0..series.len() {
        labels.push(value_label(&series.get(idx)?));
    }
    Ok(labels)
}

// =============================================================================
// Tests
// =============================================================================
