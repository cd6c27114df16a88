//! Gradient boosting over shallow regression trees.

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::model::forest::aggregate_importances;
use crate::model::tree::{RegressionTree, TreeParams};

/// Round count, shrinkage and weak-learner shape for a boosted ensemble.
#[derive(Debug, Clone)]
pub struct BoostingParams {
    pub n_rounds: usize,
    pub learning_rate: f64,
    pub tree: TreeParams,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
            tree: TreeParams {
                max_depth: 3,
                min_samples_split: 2,
                min_samples_leaf: 1,
            },
        }
    }
}

/// A fitted gradient boosting regressor for squared-error loss.
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    base: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoosting {
    /// Fit `n_rounds` trees, each on the residuals of the ensemble so far,
    /// starting from the target mean.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &BoostingParams) -> Result<Self> {
        let rows = x.len();
        if rows == 0 || rows != y.len() {
            return Err(PipelineError::TrainingFailed(format!(
                "gradient boosting needs matching non-empty inputs, got {} rows and {} targets",
                rows,
                y.len()
            )));
        }

        let base = y.iter().sum::<f64>() / rows as f64;
        let mut predictions = vec![base; rows];
        let mut residuals: Vec<f64> = y.iter().zip(&predictions).map(|(t, p)| t - p).collect();
        let mut trees = Vec::with_capacity(params.n_rounds);

        for round in 0..params.n_rounds {
            // Nothing left to correct; further rounds would only fit noise
            // in the last floating-point bits.
            if residuals.iter().all(|r| r.abs() < 1e-12) {
                debug!("Residuals vanished after {} rounds", round);
                break;
            }
            let tree = RegressionTree::fit(x, &residuals, &params.tree)?;
            for ((prediction, residual), (row, target)) in predictions
                .iter_mut()
                .zip(&mut residuals)
                .zip(x.iter().zip(y))
            {
                *prediction += params.learning_rate * tree.predict_row(row);
                *residual = target - *prediction;
            }
            trees.push(tree);
        }
        debug!("Boosted {} rounds on {} rows", trees.len(), rows);

        Ok(Self {
            base,
            learning_rate: params.learning_rate,
            trees,
            n_features: x[0].len(),
        })
    }

    /// Predict a single row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.base
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|t| t.predict_row(row))
                    .sum::<f64>()
    }

    /// Predict every row of a feature matrix.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Total split gain per feature across all rounds, normalized to sum
    /// to 1. All zeros when no round ever split.
    pub fn importances(&self) -> Vec<f64> {
        aggregate_importances(self.trees.iter().map(|t| t.importances()), self.n_features)
    }

    pub fn n_rounds(&self) -> usize {
        self.trees.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let y = vec![0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0];
        (x, y)
    }

    #[test]
    fn test_fit_converges_on_step_function() {
        let (x, y) = step_data();
        let model = GradientBoosting::fit(&x, &y, &BoostingParams::default()).unwrap();

        // 100 rounds at 0.1 shrinkage leave residuals around 0.9^100.
        for (row, target) in x.iter().zip(&y) {
            assert!((model.predict_row(row) - target).abs() < 0.01);
        }
    }

    #[test]
    fn test_single_round_moves_a_learning_rate_step() {
        let (x, y) = step_data();
        let params = BoostingParams {
            n_rounds: 1,
            ..BoostingParams::default()
        };
        let model = GradientBoosting::fit(&x, &y, &params).unwrap();

        // Base is 5.0; one perfectly-fitting tree moves 10% of the residual.
        assert!((model.predict_row(&[0.0]) - 4.5).abs() < 1e-9);
        assert!((model.predict_row(&[7.0]) - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_constant_target_stops_early() {
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let y = vec![4.0; 6];
        let model = GradientBoosting::fit(&x, &y, &BoostingParams::default()).unwrap();

        assert_eq!(model.n_rounds(), 0);
        assert_eq!(model.predict_row(&[3.0]), 4.0);
        assert_eq!(model.importances(), vec![0.0]);
    }

    #[test]
    fn test_importances_sum_to_one() {
        let (x, y) = step_data();
        let model = GradientBoosting::fit(&x, &y, &BoostingParams::default()).unwrap();

        let imps = model.importances();
        assert!((imps.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        let err = GradientBoosting::fit(&[], &[], &BoostingParams::default()).unwrap_err();
        assert!(matches!(err, PipelineError::TrainingFailed(_)));
    }
}
