//! Track Popularity Analytics Pipeline
//!
//! A batch pipeline built on Polars that turns a raw track-metadata CSV
//! into EDA reports and evaluated popularity regressors.
//!
//! # Overview
//!
//! One run walks a fixed sequence of stages:
//!
//! - **Extract**: CSV ingestion with parser fallbacks, plus an opt-in
//!   5-row demo dataset when the input file is missing
//! - **Clean**: column-name normalization, identifier-column removal,
//!   mean/placeholder imputation and duplicate-row removal
//! - **Transform**: duration conversion to seconds, one-hot and label
//!   encoding, min-max scaling of the audio features
//! - **EDA**: descriptive statistics and correlation documents in
//!   markdown, plus a set of PNG charts
//! - **Model**: linear regression, random forest and gradient boosting
//!   on a deterministic train/test split, scored with R² and RMSE and
//!   persisted as one JSON document
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hitscore::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .output_dir("results")
//!     .seed(42)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .build()?
//!     .run("dataset.csv".as_ref())?;
//!
//! println!("Transformed dataset: {}", outcome.transformed_path.display());
//! if let Some(best) = outcome.model_report.best_by_rmse() {
//!     println!("Best model: {} (rmse {:.4})", best.name, best.rmse);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to customize a run:
//!
//! ```rust,ignore
//! use hitscore::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .output_dir("out")          // documents, charts and results JSON
//!     .demo_fallback(true)        // missing input -> built-in demo rows
//!     .strict_schema(true)        // missing feature columns abort modeling
//!     .render_charts(false)       // markdown and JSON only
//!     .forest_trees(200)
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod eda;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, Imputer, TEXT_PLACEHOLDER};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use dataset::{DatasetSource, Extractor};
pub use eda::{ColumnStats, CorrelationMatrix, EdaReporter};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use model::{
    GradientBoosting, LinearRegression, Modeler, RandomForest, RegressionTree, TreeParams,
};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use schema::{FeatureSchema, SchemaCheck, MODEL_SCHEMA_V1, TARGET_COLUMN};
pub use transform::Transformer;
pub use types::{
    EdaArtifacts, EtlEntry, EtlSummary, FeatureImportance, ModelReport, ModelScore,
    PipelineOutcome, SchemaInfo, SplitInfo,
};
