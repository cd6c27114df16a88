//! Configuration types for the track-analytics pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the full ETL + EDA + modeling run.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use hitscore::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .output_dir("results")
///     .demo_fallback(true)
///     .seed(42)
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Output directory for documents, charts and the results JSON.
    /// Default: "results"
    pub output_dir: PathBuf,

    /// File name of the transformed-dataset CSV written after the ETL stage.
    /// Default: "tracks_transformed.csv"
    pub transformed_name: String,

    /// Whether a missing input file substitutes the built-in 5-row demo
    /// dataset instead of failing. Off by default; the fixture is an
    /// explicit opt-in, not an I/O fallback.
    /// Default: false
    pub demo_fallback: bool,

    /// Seed for the train/test shuffle and the forest bootstrap RNG.
    /// Default: 42
    pub seed: u64,

    /// Fraction of rows held out for model evaluation (0.0 - 1.0 exclusive).
    /// Default: 0.2
    pub test_fraction: f64,

    /// Number of trees in the random forest.
    /// Default: 100
    pub forest_trees: usize,

    /// Number of boosting rounds (trees) in the gradient-boosted model.
    /// Default: 100
    pub boosting_rounds: usize,

    /// Shrinkage applied to each boosting round.
    /// Default: 0.1
    pub learning_rate: f64,

    /// Whether missing feature-schema columns abort the modeling stage.
    /// When false, missing features are logged and the present subset is used.
    /// Default: false
    pub strict_schema: bool,

    /// Whether chart images are rendered. Markdown documents and the
    /// results JSON are written either way.
    /// Default: true
    pub render_charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            transformed_name: "tracks_transformed.csv".to_string(),
            demo_fallback: false,
            seed: 42,
            test_fraction: 0.2,
            forest_trees: 100,
            boosting_rounds: 100,
            learning_rate: 0.1,
            strict_schema: false,
            render_charts: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigValidationError::InvalidFraction {
                field: "test_fraction".to_string(),
                value: self.test_fraction,
            });
        }

        if self.forest_trees == 0 {
            return Err(ConfigValidationError::InvalidTreeCount {
                field: "forest_trees".to_string(),
                value: self.forest_trees,
            });
        }

        if self.boosting_rounds == 0 {
            return Err(ConfigValidationError::InvalidTreeCount {
                field: "boosting_rounds".to_string(),
                value: self.boosting_rounds,
            });
        }

        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ConfigValidationError::InvalidLearningRate(
                self.learning_rate,
            ));
        }

        if self.transformed_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTransformedName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid fraction for '{field}': {value} (must be strictly between 0.0 and 1.0)")]
    InvalidFraction { field: String, value: f64 },

    #[error("Invalid tree count for '{field}': {value} (must be at least 1)")]
    InvalidTreeCount { field: String, value: usize },

    #[error("Invalid learning rate: {0} (must be a positive finite number)")]
    InvalidLearningRate(f64),

    #[error("Transformed-dataset file name must not be empty")]
    EmptyTransformedName,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    output_dir: Option<PathBuf>,
    transformed_name: Option<String>,
    demo_fallback: Option<bool>,
    seed: Option<u64>,
    test_fraction: Option<f64>,
    forest_trees: Option<usize>,
    boosting_rounds: Option<usize>,
    learning_rate: Option<f64>,
    strict_schema: Option<bool>,
    render_charts: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the output directory for documents, charts and results.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the file name of the transformed-dataset CSV.
    pub fn transformed_name(mut self, name: impl Into<String>) -> Self {
        self.transformed_name = Some(name.into());
        self
    }

    /// Enable or disable the demo-dataset substitution for a missing input file.
    pub fn demo_fallback(mut self, enable: bool) -> Self {
        self.demo_fallback = Some(enable);
        self
    }

    /// Set the RNG seed used for the split and the forest bootstrap.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the held-out test fraction.
    ///
    /// # Arguments
    /// * `fraction` - Value strictly between 0.0 and 1.0 (e.g., 0.2 = 20%)
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = Some(fraction);
        self
    }

    /// Set the number of random-forest trees.
    pub fn forest_trees(mut self, trees: usize) -> Self {
        self.forest_trees = Some(trees);
        self
    }

    /// Set the number of gradient-boosting rounds.
    pub fn boosting_rounds(mut self, rounds: usize) -> Self {
        self.boosting_rounds = Some(rounds);
        self
    }

    /// Set the boosting learning rate.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }

    /// Enable or disable strict feature-schema checking.
    ///
    /// When strict, any column missing from the feature schema aborts the
    /// modeling stage instead of training on the present subset.
    pub fn strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = Some(strict);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("results")),
            transformed_name: self
                .transformed_name
                .unwrap_or_else(|| "tracks_transformed.csv".to_string()),
            demo_fallback: self.demo_fallback.unwrap_or(false),
            seed: self.seed.unwrap_or(42),
            test_fraction: self.test_fraction.unwrap_or(0.2),
            forest_trees: self.forest_trees.unwrap_or(100),
            boosting_rounds: self.boosting_rounds.unwrap_or(100),
            learning_rate: self.learning_rate.unwrap_or(0.1),
            strict_schema: self.strict_schema.unwrap_or(false),
            render_charts: self.render_charts.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.transformed_name, "tracks_transformed.csv");
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.forest_trees, 100);
        assert_eq!(config.boosting_rounds, 100);
        assert_eq!(config.learning_rate, 0.1);
        assert!(!config.demo_fallback);
        assert!(!config.strict_schema);
        assert!(config.render_charts);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.2);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .output_dir("out")
            .transformed_name("transformed.csv")
            .demo_fallback(true)
            .seed(7)
            .test_fraction(0.25)
            .forest_trees(10)
            .boosting_rounds(20)
            .learning_rate(0.3)
            .strict_schema(true)
            .render_charts(false)
            .build()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.transformed_name, "transformed.csv");
        assert!(config.demo_fallback);
        assert_eq!(config.seed, 7);
        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(config.forest_trees, 10);
        assert_eq!(config.boosting_rounds, 20);
        assert_eq!(config.learning_rate, 0.3);
        assert!(config.strict_schema);
        assert!(!config.render_charts);
    }

    #[test]
    fn test_validation_invalid_test_fraction() {
        let result = PipelineConfig::builder().test_fraction(1.0).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidFraction { .. }
        ));
    }

    #[test]
    fn test_validation_zero_trees() {
        let result = PipelineConfig::builder().forest_trees(0).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidTreeCount { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_learning_rate() {
        let result = PipelineConfig::builder().learning_rate(0.0).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidLearningRate(_)
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.output_dir, deserialized.output_dir);
        assert_eq!(config.seed, deserialized.seed);
        assert_eq!(config.test_fraction, deserialized.test_fraction);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "output_dir": "custom_results",
            "transformed_name": "tracks.csv",
            "demo_fallback": true,
            "seed": 1,
            "test_fraction": 0.3,
            "forest_trees": 50,
            "boosting_rounds": 25,
            "learning_rate": 0.05,
            "strict_schema": true,
            "render_charts": false
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.output_dir.to_str().unwrap(), "custom_results");
        assert_eq!(config.transformed_name, "tracks.csv");
        assert!(config.demo_fallback);
        assert_eq!(config.forest_trees, 50);
    }
}
