//! Modeling stage: schema check, split, three regressors, one results
//! document.
//!
//! The stage trains a linear regression, a random forest and a gradient
//! boosting model on the same deterministic split, evaluates each on the
//! held-out rows and persists everything as `model_results.json`.

mod boosting;
mod forest;
mod linear;
pub mod metrics;
mod split;
mod tree;

pub use boosting::{BoostingParams, GradientBoosting};
pub use forest::{ForestParams, RandomForest};
pub use linear::LinearRegression;
pub use split::train_test_split;
pub use tree::{RegressionTree, TreeParams};

use chrono::Local;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::schema::MODEL_SCHEMA_V1;
use crate::types::{FeatureImportance, ModelReport, ModelScore, SchemaInfo, SplitInfo};
use crate::utils::column_as_f64;

/// File name of the persisted results document.
pub const RESULTS_FILE: &str = "model_results.json";

/// Trains and evaluates the popularity regressors.
pub struct Modeler {
    output_dir: PathBuf,
    seed: u64,
    test_fraction: f64,
    forest_trees: usize,
    boosting_rounds: usize,
    learning_rate: f64,
    strict_schema: bool,
}

impl Modeler {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            seed: config.seed,
            test_fraction: config.test_fraction,
            forest_trees: config.forest_trees,
            boosting_rounds: config.boosting_rounds,
            learning_rate: config.learning_rate,
            strict_schema: config.strict_schema,
        }
    }

    /// Check the feature schema, split, train the three models and persist
    /// the results document.
    pub fn run(&self, df: &DataFrame) -> Result<ModelReport> {
        let schema = MODEL_SCHEMA_V1;
        let check = schema.check(df);
        if !check.target_present {
            return Err(PipelineError::ColumnNotFound(schema.target.to_string()));
        }
        if !check.missing.is_empty() {
            if self.strict_schema {
                return Err(PipelineError::SchemaMismatch {
                    schema: schema.qualified_name(),
                    missing: check.missing,
                });
            }
            warn!(
                "Schema {} is missing {:?}; training on the {} present feature(s)",
                schema.qualified_name(),
                check.missing,
                check.present.len()
            );
        }
        if check.present.is_empty() {
            return Err(PipelineError::TrainingFailed(
                "no feature columns available".to_string(),
            ));
        }

        let (train, test) = train_test_split(df, self.test_fraction, self.seed)?;
        let (x_train, y_train) = feature_matrix(&train, &check.present, schema.target)?;
        let (x_test, y_test) = feature_matrix(&test, &check.present, schema.target)?;
        info!(
            "Training on {} rows, evaluating on {} rows, {} features",
            train.height(),
            test.height(),
            check.present.len()
        );

        let mut models = Vec::with_capacity(3);

        let model = LinearRegression::fit(&x_train, &y_train)?;
        models.push(score_model(
            "linear_regression",
            &y_test,
            &model.predict(&x_test),
            None,
        ));

        let forest = RandomForest::fit(
            &x_train,
            &y_train,
            &ForestParams {
                n_trees: self.forest_trees,
                seed: self.seed,
                tree: TreeParams::default(),
            },
        )?;
        models.push(score_model(
            "random_forest",
            &y_test,
            &forest.predict(&x_test),
            Some(ranked_importances(&check.present, &forest.importances())),
        ));

        let boosted = GradientBoosting::fit(
            &x_train,
            &y_train,
            &BoostingParams {
                n_rounds: self.boosting_rounds,
                learning_rate: self.learning_rate,
                ..BoostingParams::default()
            },
        )?;
        models.push(score_model(
            "gradient_boosting",
            &y_test,
            &boosted.predict(&x_test),
            Some(ranked_importances(&check.present, &boosted.importances())),
        ));

        for score in &models {
            match score.r2 {
                Some(r2) => info!("{}: r2 {:.4}, rmse {:.4}", score.name, r2, score.rmse),
                None => info!("{}: r2 undefined, rmse {:.4}", score.name, score.rmse),
            }
        }

        let report = ModelReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            target: schema.target.to_string(),
            features_used: check.present.clone(),
            schema: SchemaInfo {
                name: schema.name.to_string(),
                version: schema.version,
                missing_columns: check.missing,
            },
            split: SplitInfo {
                train_rows: train.height(),
                test_rows: test.height(),
                seed: self.seed,
                test_fraction: self.test_fraction,
            },
            models,
        };
        self.persist(&report)?;
        Ok(report)
    }

    fn persist(&self, report: &ModelReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&path)?;
        file.write_all(json.as_bytes())?;
        info!("Model results saved: {}", path.display());
        Ok(path)
    }
}

/// Pull the feature columns and target out of a frame as dense matrices.
///
/// Nulls are a contract violation at this point; the cleaner guarantees
/// none survive, so any gap aborts training instead of being patched here.
fn feature_matrix(
    df: &DataFrame,
    features: &[String],
    target: &str,
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let rows = df.height();
    let mut matrix = vec![Vec::with_capacity(features.len()); rows];
    for feature in features {
        let values = column_as_f64(df, feature)?;
        if values.len() != rows {
            return Err(PipelineError::TrainingFailed(format!(
                "feature column '{feature}' contains nulls"
            )));
        }
        for (row, value) in matrix.iter_mut().zip(&values) {
            row.push(*value);
        }
    }

    let y = column_as_f64(df, target)?;
    if y.len() != rows {
        return Err(PipelineError::TrainingFailed(format!(
            "target column '{target}' contains nulls"
        )));
    }
    Ok((matrix, y))
}

/// Pair features with their gains, strongest first. Ties break on the
/// feature name so reports are stable.
fn ranked_importances(features: &[String], gains: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = features
        .iter()
        .zip(gains)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.feature.cmp(&b.feature))
    });
    ranked
}

fn score_model(
    name: &str,
    y_test: &[f64],
    predictions: &[f64],
    feature_importances: Option<Vec<FeatureImportance>>,
) -> ModelScore {
    ModelScore {
        name: name.to_string(),
        r2: metrics::r2(y_test, predictions),
        rmse: metrics::rmse(y_test, predictions),
        feature_importances,
    }
}

// ============================================================================
// Tests
// ============================================================================
