//! Data cleaning stage.
//!
//! This module provides functionality for:
//! - Normalizing column names (lowercase, `[a-z0-9_]` only)
//! - Dropping identifier-like columns that carry no signal
//! - Imputing missing values (numeric mean, text placeholder)
//! - Removing exact duplicate rows
//!
//! The stage consumes its input frame and returns a new one; every change
//! is recorded in the [`EtlSummary`].

mod imputers;

pub use imputers::Imputer;

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, info};

use crate::error::Result;
use crate::schema::DROPPED_COLUMNS;
use crate::types::EtlSummary;
use crate::utils::{is_boolean_dtype, is_numeric_dtype, is_string_dtype};

/// Placeholder written into missing text values.
pub const TEXT_PLACEHOLDER: &str = "unknown";

// Column-name sanitizer - compiled once at startup
static NAME_SANITIZER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("Invalid regex: column sanitizer"));

/// Data cleaner for the fixed cleaning sequence.
pub struct DataCleaner;

impl DataCleaner {
    /// Run the full cleaning sequence: name normalization, identifier
    /// drops, imputation, then duplicate removal.
    pub fn clean(df: DataFrame, summary: &mut EtlSummary) -> Result<DataFrame> {
        info!("Cleaning dataset ({} rows)...", df.height());

        let mut df = df;
        Self::normalize_column_names(&mut df, summary)?;
        Self::drop_irrelevant_columns(&mut df, summary);
        Self::impute_missing(&mut df, summary)?;
        let df = Self::drop_duplicate_rows(df, summary)?;

        Ok(df)
    }

    /// Lowercase, trim and strip column names to `[a-z0-9_]`.
    pub fn normalize_column_names(df: &mut DataFrame, summary: &mut EtlSummary) -> Result<()> {
        let old_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let new_names: Vec<String> = old_names.iter().map(|n| sanitize_column_name(n)).collect();

        let renamed = old_names
            .iter()
            .zip(new_names.iter())
            .filter(|(old, new)| old.as_str() != new.as_str())
            .count();

        if renamed > 0 {
            df.set_column_names(new_names)?;
            debug!("Normalized {} column name(s)", renamed);
        }
        summary.record(
            "normalize_names",
            format!("sanitized {renamed} of {} column names", old_names.len()),
        );
        Ok(())
    }

    /// Drop identifier columns when present; absence is ignored.
    pub fn drop_irrelevant_columns(df: &mut DataFrame, summary: &mut EtlSummary) {
        let present: Vec<String> = DROPPED_COLUMNS
            .iter()
            .filter(|&&name| df.column(name).is_ok())
            .map(|&name| name.to_string())
            .collect();

        if present.is_empty() {
            summary.record("drop_columns", "no identifier columns present");
            return;
        }

        let cols_ref: Vec<PlSmallStr> = present.iter().map(|s| s.as_str().into()).collect();
        *df = df.drop_many(cols_ref);
        summary.record("drop_columns", format!("dropped: {}", present.join(", ")));
        debug!("Dropped identifier columns: {:?}", present);
    }

    /// Impute every column that still has missing values.
    ///
    /// Numeric columns take their mean, text columns the placeholder,
    /// boolean columns their most frequent value. Anything else is left
    /// untouched with a warning.
    pub fn impute_missing(df: &mut DataFrame, summary: &mut EtlSummary) -> Result<()> {
        let columns: Vec<(String, DataType, usize)> = df
            .get_columns()
            .iter()
            .map(|col| {
                (
                    col.name().to_string(),
                    col.dtype().clone(),
                    col.null_count(),
                )
            })
            .collect();

        for (name, dtype, null_count) in columns {
            if null_count == 0 {
                continue;
            }

            if is_numeric_dtype(&dtype) {
                Imputer::apply_numeric_mean(df, &name, summary)?;
            } else if is_string_dtype(&dtype) {
                Imputer::apply_text_placeholder(df, &name, TEXT_PLACEHOLDER, summary)?;
            } else if is_boolean_dtype(&dtype) {
                Self::impute_boolean_mode(df, &name, null_count, summary)?;
            } else {
                summary.add_warning(format!(
                    "column '{name}' has {null_count} missing value(s) of unhandled dtype {dtype}"
                ));
            }
        }
        Ok(())
    }

    /// Drop exact duplicate rows, keeping the first occurrence.
    pub fn drop_duplicate_rows(df: DataFrame, summary: &mut EtlSummary) -> Result<DataFrame> {
        let before = df.height();
        let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let after = df.height();

        if before > after {
            debug!("Removed {} duplicate rows", before - after);
        }
        summary.record(
            "dedup",
            format!("{before} rows -> {after} rows ({} removed)", before - after),
        );
        Ok(df)
    }

    fn impute_boolean_mode(
        df: &mut DataFrame,
        name: &str,
        null_count: usize,
        summary: &mut EtlSummary,
    ) -> Result<()> {
        let series = df.column(name)?.as_materialized_series().clone();
        let ca = series.bool()?;

        let trues = ca.into_iter().flatten().filter(|v| *v).count();
        let present = ca.len() - null_count;
        if present == 0 {
            return Err(crate::error::PipelineError::NoValidValues(name.to_string()));
        }
        let fill = trues * 2 >= present;

        let values: Vec<bool> = ca.into_iter().map(|opt| opt.unwrap_or(fill)).collect();
        df.replace(name, Series::new(series.name().clone(), values))?;
        summary.record(
            format!("impute:{name}"),
            format!("filled {null_count} missing value(s) with most frequent value {fill}"),
        );
        Ok(())
    }
}

/// Lowercase a column name and strip everything outside `[a-z0-9_]`.
fn sanitize_column_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    NAME_SANITIZER.replace_all(&lowered, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_column_name() {
        assert_eq!(sanitize_column_name("Popularity "), "popularity");
        assert_eq!(sanitize_column_name("Track Genre"), "trackgenre");
        assert_eq!(sanitize_column_name("duration_ms"), "duration_ms");
        assert_eq!(sanitize_column_name("Loudness (dB)"), "loudnessdb");
    }

    #[test]
    fn test_normalize_column_names() {
        let mut df = df![
            "Popularity" => [1.0f64],
            "track_genre" => ["pop"],
        ]
        .unwrap();
        let mut summary = EtlSummary::new();

        DataCleaner::normalize_column_names(&mut df, &mut summary).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["popularity".to_string(), "track_genre".to_string()]);
        assert!(summary.entries[0].outcome.contains("1 of 2"));
    }

    #[test]
    fn test_drop_irrelevant_columns() {
        let mut df = df![
            "track_id" => ["t1"],
            "album_name" => ["Album X"],
            "popularity" => [80.0f64],
        ]
        .unwrap();
        let mut summary = EtlSummary::new();

        DataCleaner::drop_irrelevant_columns(&mut df, &mut summary);

        assert_eq!(df.width(), 1);
        assert!(df.column("popularity").is_ok());
        assert!(summary.entries[0].outcome.contains("track_id"));
    }

    #[test]
    fn test_drop_irrelevant_columns_when_absent() {
        let mut df = df!["popularity" => [80.0f64]].unwrap();
        let mut summary = EtlSummary::new();

        DataCleaner::drop_irrelevant_columns(&mut df, &mut summary);

        assert_eq!(df.width(), 1);
        assert!(summary.entries[0].outcome.contains("no identifier columns"));
    }

    #[test]
    fn test_impute_missing_covers_all_dtypes() {
        let mut df = df![
            "popularity" => [Some(10.0f64), None, Some(20.0)],
            "artists" => [None::<&str>, Some("A"), Some("B")],
            "explicit" => [Some(true), Some(true), None],
        ]
        .unwrap();
        let mut summary = EtlSummary::new();

        DataCleaner::impute_missing(&mut df, &mut summary).unwrap();

        let nulls: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
        assert_eq!(nulls, 0);

        let pop = df.column("popularity").unwrap();
        assert_eq!(pop.get(1).unwrap().try_extract::<f64>().unwrap(), 15.0);

        let explicit = df.column("explicit").unwrap().as_materialized_series().clone();
        assert_eq!(explicit.bool().unwrap().get(2), Some(true));
    }

    #[test]
    fn test_drop_duplicate_rows_keeps_first_and_order() {
        let df = df![
            "a" => [1i64, 2, 1, 3],
            "b" => ["x", "y", "x", "z"],
        ]
        .unwrap();
        let mut summary = EtlSummary::new();

        let deduped = DataCleaner::drop_duplicate_rows(df, &mut summary).unwrap();

        assert_eq!(deduped.height(), 3);
        let a = deduped.column("a").unwrap();
        assert_eq!(a.get(0).unwrap().try_extract::<i64>().unwrap(), 1);
        assert_eq!(a.get(1).unwrap().try_extract::<i64>().unwrap(), 2);
        assert_eq!(a.get(2).unwrap().try_extract::<i64>().unwrap(), 3);
        assert!(summary.entries[0].outcome.contains("1 removed"));
    }

    #[test]
    fn test_clean_end_to_end() {
        let df = df![
            "Track_Id " => ["t1", "t2", "t2"],
            "popularity" => [Some(10.0f64), None, None],
            "artists" => [Some("A"), Some("B"), Some("B")],
        ]
        .unwrap();
        let mut summary = EtlSummary::new();

        let cleaned = DataCleaner::clean(df, &mut summary).unwrap();

        // Identifier dropped, imputation before dedup (so both null rows
        // were filled with the same mean and collapsed).
        assert!(cleaned.column("track_id").is_err());
        assert_eq!(cleaned.height(), 2);
        let nulls: usize = cleaned.get_columns().iter().map(|c| c.null_count()).sum();
        assert_eq!(nulls, 0);
    }
}
