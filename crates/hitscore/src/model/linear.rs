//! Ordinary least squares via the normal equations.

use crate::error::{PipelineError, Result};

/// Keeps the normal matrix solvable when features are collinear.
const RIDGE_EPSILON: f64 = 1e-10;

/// A fitted linear regression model.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Fit on a row-major feature matrix and a target vector.
    ///
    /// Solves `(XᵀX + εI) w = Xᵀy` with a bias column prepended to X,
    /// using Gaussian elimination with partial pivoting.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        let rows = x.len();
        if rows == 0 || rows != y.len() {
            return Err(PipelineError::TrainingFailed(format!(
                "linear regression needs matching non-empty inputs, got {} rows and {} targets",
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

        // Normal matrix over the bias-extended design matrix, built in one
        // pass over the rows.
        let p = features + 1;
        let mut normal = vec![vec![0.0; p]; p];
        let mut moment = vec![0.0; p];
        for (row, &target) in x.iter().zip(y) {
            for i in 0..p {
                let xi = if i == 0 { 1.0 } else { row[i - 1] };
                moment[i] += xi * target;
                for j in i..p {
                    let xj = if j == 0 { 1.0 } else { row[j - 1] };
                    normal[i][j] += xi * xj;
                }
            }
        }
        for i in 0..p {
            for j in 0..i {
                normal[i][j] = normal[j][i];
            }
            normal[i][i] += RIDGE_EPSILON;
        }

        let weights = solve_linear_system(normal, moment)?;
        Ok(Self {
            intercept: weights[0],
            coefficients: weights[1..].to_vec(),
        })
    }

    /// Predict a single row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, v)| w * v)
                .sum::<f64>()
    }

    /// Predict every row of a feature matrix.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

/// Solve `a * w = b` in place with partial pivoting.
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(PipelineError::TrainingFailed(
                "singular feature matrix".to_string(),
            ));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut w = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * w[k]).sum();
        w[row] = (b[row] - tail) / a[row][row];
    }
    Ok(w)
}

// ============================================================================
// Tests
// ============================================================================
