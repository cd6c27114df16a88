//! CART-style regression tree.
//!
//! Splits minimize the summed squared error of the two children. The tree
//! also accumulates, per feature, the total squared-error reduction of the
//! splits taken on it; ensembles aggregate those into feature importances.

use crate::error::{PipelineError, Result};

/// Splits with less gain than this are treated as noise.
const MIN_GAIN: f64 = 1e-12;

/// Growth limits for a single tree.
#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 16,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted regression tree.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Fit on a row-major feature matrix and a target vector.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &TreeParams) -> Result<Self> {
        let rows = x.len();
        if rows == 0 || rows != y.len() {
            return Err(PipelineError::TrainingFailed(format!(
                "tree needs matching non-empty inputs, got {} rows and {} targets",
                rows,
                y.len()
            )));
        }
        let features = x[0].len();
        if x.iter().any(|row| row.len() != features) {
            return Err(PipelineError::TrainingFailed(
                "feature matrix has ragged rows".to_string(),
            ));
        }

        let mut builder = TreeBuilder {
            x,
            y,
            params,
            importances: vec![0.0; features],
        };
        let indices: Vec<usize> = (0..rows).collect();
        let root = builder.build(indices, 0);
        Ok(Self {
            root,
            importances: builder.importances,
        })
    }

    /// Predict a single row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Predict every row of a feature matrix.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Raw squared-error reduction per feature, unnormalized.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: &'a TreeParams,
    importances: Vec<f64>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> Node {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let ss: f64 = indices.iter().map(|&i| self.y[i] * self.y[i]).sum();
        let mean = sum / n as f64;
        let sse = (ss - sum * sum / n as f64).max(0.0);

        if depth >= self.params.max_depth || n < self.params.min_samples_split || sse <= MIN_GAIN {
            return Node::Leaf { value: mean };
        }

        let Some(split) = self.best_split(&indices, sse) else {
            return Node::Leaf { value: mean };
        };
        self.importances[split.feature] += split.gain;

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][split.feature] <= split.threshold);
        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);
        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Scan every feature for the split with the lowest child squared error.
    ///
    /// Per feature the rows are sorted once; a running sum then gives each
    /// candidate's left/right errors in a single pass.
    fn best_split(&self, indices: &[usize], parent_sse: f64) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let total_sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let total_ss: f64 = indices.iter().map(|&i| self.y[i] * self.y[i]).sum();

        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in 0..self.x[0].len() {
            order.sort_unstable_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut sum_left = 0.0;
            let mut ss_left = 0.0;
            for pos in 1..n {
                let target = self.y[order[pos - 1]];
                sum_left += target;
                ss_left += target * target;

                if pos < min_leaf || n - pos < min_leaf {
                    continue;
                }
                let lo = self.x[order[pos - 1]][feature];
                let hi = self.x[order[pos]][feature];
                if lo == hi {
                    continue;
                }

                let n_left = pos as f64;
                let n_right = (n - pos) as f64;
                let sum_right = total_sum - sum_left;
                let ss_right = total_ss - ss_left;
                let sse_left = (ss_left - sum_left * sum_left / n_left).max(0.0);
                let sse_right = (ss_right - sum_right * sum_right / n_right).max(0.0);
                let gain = parent_sse - sse_left - sse_right;

                if gain > MIN_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
                    // A midpoint that rounds up to `hi` would send the whole
                    // node right, so fall back to the left value.
                    let mid = 0.5 * (lo + hi);
                    let threshold = if mid >= hi { lo } else { mid };
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }
}

// ============================================================================
// Tests
// ============================================================================
