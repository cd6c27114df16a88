//! Random forest of bootstrap-sampled regression trees.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::model::tree::{RegressionTree, TreeParams};

/// Ensemble size and sampling seed for a forest.
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            tree: TreeParams::default(),
        }
    }
}

/// A fitted random forest regressor.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit `n_trees` trees, each on a bootstrap resample of the rows.
    ///
    /// Tree `t` draws its sample from a generator seeded with `seed + t`,
    /// so a forest is reproducible tree by tree.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Result<Self> {
        let rows = x.len();
        if rows == 0 || rows != y.len() {
            return Err(PipelineError::TrainingFailed(format!(
                "random forest needs matching non-empty inputs, got {} rows and {} targets",
                rows,
                y.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(PipelineError::TrainingFailed(
                "random forest needs at least one tree".to_string(),
            ));
        }

        let mut trees = Vec::with_capacity(params.n_trees);
        for t in 0..params.n_trees {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
            let mut sample_x = Vec::with_capacity(rows);
            let mut sample_y = Vec::with_capacity(rows);
            for _ in 0..rows {
                let i = rng.gen_range(0..rows);
                sample_x.push(x[i].clone());
                sample_y.push(y[i]);
            }
            trees.push(RegressionTree::fit(&sample_x, &sample_y, &params.tree)?);
        }
        debug!("Fitted {} trees on {} rows", trees.len(), rows);

        Ok(Self {
            trees,
            n_features: x[0].len(),
        })
    }

    /// Predict a single row as the mean of all tree predictions.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        total / self.trees.len() as f64
    }

    /// Predict every row of a feature matrix.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Mean split gain per feature across all trees, normalized to sum
    /// to 1. All zeros when no tree ever split.
    pub fn importances(&self) -> Vec<f64> {
        aggregate_importances(self.trees.iter().map(|t| t.importances()), self.n_features)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Sum per-tree gains and rescale so the importances sum to 1.
pub(crate) fn aggregate_importances<'a>(
    per_tree: impl Iterator<Item = &'a [f64]>,
    n_features: usize,
) -> Vec<f64> {
    let mut totals = vec![0.0; n_features];
    for gains in per_tree {
        for (total, gain) in totals.iter_mut().zip(gains) {
            *total += gain;
        }
    }
    let overall: f64 = totals.iter().sum();
    if overall > 0.0 {
        for total in &mut totals {
            *total /= overall;
        }
    }
    totals
}

// ============================================================================
// Tests
// ============================================================================
