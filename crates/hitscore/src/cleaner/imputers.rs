//! Missing-value imputation.
//!
//! Numeric columns are filled with their own mean; text columns with a
//! constant placeholder. Both record what they did in the ETL summary.

use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::types::EtlSummary;
use crate::utils::{fill_numeric_nulls, fill_string_nulls};

/// Statistical imputation methods for filling missing values.
pub struct Imputer;

impl Imputer {
    /// Fill a numeric column's nulls with the mean of its non-null values.
    ///
    /// The mean is computed on the column as it stands when this runs, so
    /// callers control whether drops/dedup happen before or after.
    pub fn apply_numeric_mean(
        df: &mut DataFrame,
        col_name: &str,
        summary: &mut EtlSummary,
    ) -> Result<()> {
        let (mean_val, missing, series) = {
            let col = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;
            let series = col.as_materialized_series();
            (series.mean(), series.null_count(), series.clone())
        };

        if missing == 0 {
            return Ok(());
        }

        let mean_val = mean_val.ok_or_else(|| PipelineError::NoValidValues(col_name.to_string()))?;

        let filled = fill_numeric_nulls(&series, mean_val)?;
        df.replace(col_name, filled)?;
        summary.record(
            format!("impute:{col_name}"),
            format!("filled {missing} missing value(s) with mean {mean_val:.4}"),
        );
        Ok(())
    }

    /// Fill a text column's nulls with a constant placeholder.
    pub fn apply_text_placeholder(
        df: &mut DataFrame,
        col_name: &str,
        placeholder: &str,
        summary: &mut EtlSummary,
    ) -> Result<()> {
        let (missing, series) = {
            let col = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;
            let series = col.as_materialized_series();
            (series.null_count(), series.clone())
        };

        if missing == 0 {
            return Ok(());
        }

        let filled = fill_string_nulls(&series, placeholder)?;
        df.replace(col_name, filled)?;
        summary.record(
            format!("impute:{col_name}"),
            format!("filled {missing} missing value(s) with placeholder '{placeholder}'"),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_mean_fills_nulls() {
        let mut df = df!["popularity" => [Some(80.0f64), None, Some(90.0), Some(40.0), Some(75.0)]]
            .unwrap();
        let mut summary = EtlSummary::new();

        Imputer::apply_numeric_mean(&mut df, "popularity", &mut summary).unwrap();

        let col = df.column("popularity").unwrap();
        assert_eq!(col.null_count(), 0);
        // Mean of the four present values.
        let filled = col.get(1).unwrap().try_extract::<f64>().unwrap();
        assert!((filled - 71.25).abs() < 1e-9);
        assert_eq!(summary.entries.len(), 1);
        assert!(summary.entries[0].outcome.contains("mean 71.25"));
    }

    #[test]
    fn test_numeric_mean_skips_complete_columns() {
        let mut df = df!["tempo" => [120.0f64, 90.0]].unwrap();
        let mut summary = EtlSummary::new();

        Imputer::apply_numeric_mean(&mut df, "tempo", &mut summary).unwrap();
        assert!(summary.entries.is_empty());
    }

    #[test]
    fn test_numeric_mean_all_null_is_an_error() {
        let mut df = df!["empty" => [None::<f64>, None, None]].unwrap();
        let mut summary = EtlSummary::new();

        let result = Imputer::apply_numeric_mean(&mut df, "empty", &mut summary);
        assert!(matches!(result, Err(PipelineError::NoValidValues(_))));
    }

    #[test]
    fn test_text_placeholder_fills_nulls() {
        let mut df = df!["artists" => [Some("Artist A"), None, Some("Artist C")]].unwrap();
        let mut summary = EtlSummary::new();

        Imputer::apply_text_placeholder(&mut df, "artists", "unknown", &mut summary).unwrap();

        let col = df.column("artists").unwrap().as_materialized_series().clone();
        let ca = col.str().unwrap();
        assert_eq!(ca.get(1), Some("unknown"));
        assert!(summary.entries[0].outcome.contains("'unknown'"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut df = df!["a" => [1.0f64]].unwrap();
        let mut summary = EtlSummary::new();

        let result = Imputer::apply_numeric_mean(&mut df, "nope", &mut summary);
        assert!(matches!(result, Err(PipelineError::ColumnNotFound(_))));
    }
}
