//! Shared result types: the ETL step log, EDA artifact manifest and the
//! model results document.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of the ETL step log: which step ran and what it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlEntry {
    pub step: String,
    pub outcome: String,
}

/// Insertion-ordered log of what the extract/clean/transform stages did.
///
/// Purely diagnostic: the CLI prints it and the pipeline serializes it,
/// but no downstream stage depends on its contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtlSummary {
    /// Total ETL execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows before cleaning.
    pub rows_before: usize,
    /// Number of rows after cleaning and transformation.
    pub rows_after: usize,

    /// Number of columns before cleaning.
    pub columns_before: usize,
    /// Number of columns after cleaning and transformation.
    pub columns_after: usize,

    /// Ordered (step, outcome) records.
    pub entries: Vec<EtlEntry>,

    /// Non-fatal notes (skipped optional steps, constant columns, ...).
    pub warnings: Vec<String>,
}

impl EtlSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step outcome, preserving insertion order.
    pub fn record(&mut self, step: impl Into<String>, outcome: impl Into<String>) {
        self.entries.push(EtlEntry {
            step: step.into(),
            outcome: outcome.into(),
        });
    }

    /// Add a non-fatal warning.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Number of rows removed across all cleaning steps.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Files produced by the EDA stage, plus the charts it decided to skip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdaArtifacts {
    /// Paths of every document and chart written.
    pub written: Vec<PathBuf>,
    /// Human-readable reasons for each skipped optional chart.
    pub skipped: Vec<String>,
}

impl EdaArtifacts {
    /// Record a written artifact.
    pub fn add_written(&mut self, path: impl Into<PathBuf>) {
        self.written.push(path.into());
    }

    /// Record a skipped chart with its reason.
    pub fn add_skipped(&mut self, reason: impl Into<String>) {
        self.skipped.push(reason.into());
    }
}

/// A single feature's share of a tree ensemble's split gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Evaluation result for one fitted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelScore {
    /// Model name ("linear_regression", "random_forest", "gradient_boosting").
    pub name: String,
    /// Coefficient of determination on the test split. `None` when the
    /// test target is constant and R² is undefined.
    pub r2: Option<f64>,
    /// Root mean squared error on the test split.
    pub rmse: f64,
    /// Importances sorted descending; only present for tree ensembles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<FeatureImportance>>,
}

impl ModelScore {
    /// The `n` highest-ranked feature importances, if the model has any.
    pub fn top_importances(&self, n: usize) -> &[FeatureImportance] {
        match &self.feature_importances {
            Some(imps) => &imps[..imps.len().min(n)],
            None => &[],
        }
    }
}

/// Outcome of the feature-schema check performed at the modeler's entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    pub version: u32,
    /// Schema columns the dataset did not provide.
    pub missing_columns: Vec<String>,
}

/// Bookkeeping for the train/test split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitInfo {
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: u64,
    pub test_fraction: f64,
}

/// The structured results document persisted as `model_results.json`
/// and returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    /// Local timestamp of the run, `YYYY-MM-DD HH:MM:SS`.
    pub generated_at: String,
    /// Target column name.
    pub target: String,
    /// Feature columns actually fed to the models, in schema order.
    pub features_used: Vec<String>,
    pub schema: SchemaInfo,
    pub split: SplitInfo,
    pub models: Vec<ModelScore>,
}

impl ModelReport {
    /// The model with the lowest test RMSE.
    pub fn best_by_rmse(&self) -> Option<&ModelScore> {
        self.models
            .iter()
            .min_by(|a, b| a.rmse.total_cmp(&b.rmse))
    }
}

/// Everything a full pipeline run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Path of the transformed-dataset CSV.
    pub transformed_path: PathBuf,
    /// The ETL step log.
    pub etl_summary: EtlSummary,
    /// EDA artifact manifest.
    pub eda: EdaArtifacts,
    /// Model metrics and importances.
    pub model_report: ModelReport,
    /// Total wall-clock time in milliseconds.
    pub duration_ms: u64,
}

// ============================================================================
// Tests
// ============================================================================
