//! Feature engineering stage.
//!
//! Runs after cleaning and applies a fixed sequence:
//! 1. `duration_ms` becomes `duration_s` (milliseconds dropped)
//! 2. `mode` is one-hot encoded with the first category dropped
//! 3. `track_genre` is label-encoded into `genre_encoded` (original kept)
//! 4. The known numeric feature columns are min-max scaled to `[0, 1]`
//!
//! Each step skips cleanly when its source column is absent, so running the
//! stage on already-transformed data is a no-op.

mod encoders;
mod scaling;

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::schema::{
    DURATION_MS_COLUMN, DURATION_S_COLUMN, GENRE_ENCODED_COLUMN, MODE_COLUMN, SCALED_COLUMNS,
    TRACK_GENRE_COLUMN,
};
use crate::types::EtlSummary;

/// Feature transformer for the fixed engineering sequence.
pub struct Transformer;

impl Transformer {
    /// Run the full transformation sequence.
    pub fn transform(df: DataFrame, summary: &mut EtlSummary) -> Result<DataFrame> {
        info!("Transforming features ({} columns)...", df.width());

        let mut df = df;
        Self::derive_duration_seconds(&mut df, summary)?;
        Self::encode_mode(&mut df, summary)?;
        Self::encode_genre(&mut df, summary)?;
        Self::scale_features(&mut df, summary)?;

        Ok(df)
    }

    /// Convert `duration_ms` to seconds in a new `duration_s` column and
    /// drop the millisecond source.
    pub fn derive_duration_seconds(df: &mut DataFrame, summary: &mut EtlSummary) -> Result<()> {
        if df.column(DURATION_MS_COLUMN).is_err() {
            summary.record(
                "derive_duration_s",
                format!("skipped: '{DURATION_MS_COLUMN}' absent"),
            );
            return Ok(());
        }

        let ms = df
            .column(DURATION_MS_COLUMN)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let ca = ms.f64()?;
        let seconds: Vec<Option<f64>> = ca.into_iter().map(|opt| opt.map(|v| v / 1000.0)).collect();

        df.with_column(Series::new(DURATION_S_COLUMN.into(), seconds))?;
        *df = df.drop(DURATION_MS_COLUMN)?;
        summary.record(
            "derive_duration_s",
            format!("'{DURATION_MS_COLUMN}' / 1000 -> '{DURATION_S_COLUMN}'"),
        );
        Ok(())
    }

    /// One-hot encode the `mode` column with the first category dropped.
    pub fn encode_mode(df: &mut DataFrame, summary: &mut EtlSummary) -> Result<()> {
        if df.column(MODE_COLUMN).is_err() {
            summary.record("one_hot:mode", format!("skipped: '{MODE_COLUMN}' absent"));
            return Ok(());
        }

        let created = encoders::one_hot_encode(df, MODE_COLUMN, "mode_", true)?;
        if created.is_empty() {
            summary.record("one_hot:mode", "single category, no dummy columns created");
        } else {
            summary.record("one_hot:mode", format!("created: {}", created.join(", ")));
        }
        Ok(())
    }

    /// Label-encode `track_genre` into `genre_encoded`, keeping the original.
    pub fn encode_genre(df: &mut DataFrame, summary: &mut EtlSummary) -> Result<()> {
        if df.column(TRACK_GENRE_COLUMN).is_err() {
            summary.record(
                "label_encode:track_genre",
                format!("skipped: '{TRACK_GENRE_COLUMN}' absent"),
            );
            return Ok(());
        }

        let classes = encoders::label_encode(df, TRACK_GENRE_COLUMN, GENRE_ENCODED_COLUMN)?;
        summary.record(
            "label_encode:track_genre",
            format!("{} genre(s) -> '{GENRE_ENCODED_COLUMN}'", classes.len()),
        );
        debug!("Genre classes: {:?}", classes);
        Ok(())
    }

    /// Min-max scale every known feature column that is present.
    pub fn scale_features(df: &mut DataFrame, summary: &mut EtlSummary) -> Result<()> {
        let mut scaled = Vec::new();
        let mut skipped = Vec::new();

        for &name in SCALED_COLUMNS {
            let Ok(column) = df.column(name) else {
                skipped.push(name);
                continue;
            };
            let series = column.as_materialized_series().clone();
            let (result, report) = scaling::min_max_scale(&series)?;
            df.replace(name, result)?;
            if report.constant {
                summary.add_warning(format!(
                    "column '{name}' is constant ({}); scaled to all zeros",
                    report.min
                ));
            }
            scaled.push(name);
        }

        summary.record("scale", format!("min-max scaled: {}", scaled.join(", ")));
        if !skipped.is_empty() {
            summary.record("scale:skipped", format!("absent: {}", skipped.join(", ")));
            warn!("Scaling skipped absent columns: {:?}", skipped);
        }
        Ok(())
    }
}
