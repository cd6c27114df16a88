//! Custom error types for the track-analytics pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Everything
//! that crosses a stage boundary is mapped into [`PipelineError`]; only the
//! binary entry point wraps it further (with `anyhow`) for exit reporting.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist and the demo fixture was not requested.
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// A referenced column is absent from the frame.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Configuration rejected by builder validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A column is empty or entirely null where a value is required.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// The dataset does not satisfy a feature schema contract.
    #[error("Schema '{schema}' not satisfied: missing columns {missing:?}")]
    SchemaMismatch {
        schema: String,
        missing: Vec<String>,
    },

    /// Extraction failed for a reason other than a missing file.
    #[error("Failed to extract dataset: {0}")]
    ExtractionFailed(String),

    /// Chart or document generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// Model training or evaluation failed.
    #[error("Failed to train models: {0}")]
    TrainingFailed(String),

    /// Filesystem read or write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame engine failure.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Results-document serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any pipeline error wrapped with the stage that raised it.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Wrap this error with a stage or operation label.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PipelineError::ColumnNotFound("popularity".to_string());
        assert_eq!(err.to_string(), "Column 'popularity' not found in dataset");

        let err = PipelineError::InputNotFound(PathBuf::from("missing.csv"));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_schema_mismatch_lists_columns() {
        let err = PipelineError::SchemaMismatch {
            schema: "track-popularity/v1".to_string(),
            missing: vec!["mode_1".to_string(), "genre_encoded".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("track-popularity/v1"));
        assert!(msg.contains("mode_1"));
        assert!(msg.contains("genre_encoded"));
    }

    #[test]
    fn test_with_context() {
        let err = PipelineError::ColumnNotFound("tempo".to_string())
            .with_context("while scaling features");
        assert!(err.to_string().contains("while scaling features"));
        assert!(err.to_string().contains("tempo"));
    }

    #[test]
    fn test_io_context_via_trait() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = io.context("writing results document").unwrap_err();
        assert!(err.to_string().contains("writing results document"));
    }
}
