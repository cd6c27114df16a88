//! Descriptive statistics and correlation analysis.

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::utils::{column_as_f64, numeric_column_names};

/// Describe-style summary of one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Pairwise Pearson correlations over the numeric columns.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficients; NaN marks undefined pairs (constant column).
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient for a pair of columns, if both are in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Correlations of every other column against `target`, strongest
    /// positive first. Undefined coefficients are dropped.
    pub fn ranking_against(&self, target: &str) -> Vec<(String, f64)> {
        let Some(t) = self.columns.iter().position(|c| c == target) else {
            return Vec::new();
        };
        let mut pairs: Vec<(String, f64)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != t)
            .map(|(i, name)| (name.clone(), self.values[t][i]))
            .filter(|(_, v)| !v.is_nan())
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }
}

/// Compute describe-style statistics for every numeric column.
pub fn describe(df: &DataFrame) -> Result<Vec<ColumnStats>> {
    let mut out = Vec::new();
    for name in numeric_column_names(df) {
        let mut values = column_as_f64(df, &name)?;
        values.retain(|v| !v.is_nan());
        if values.is_empty() {
            continue;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        out.push(ColumnStats {
            std: sample_std(&values, mean),
            min: values[0],
            q25: quantile_sorted(&values, 0.25),
            q50: quantile_sorted(&values, 0.50),
            q75: quantile_sorted(&values, 0.75),
            max: values[count - 1],
            name,
            count,
            mean,
        });
    }
    Ok(out)
}

/// Pearson correlation matrix over the numeric columns.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let columns = numeric_column_names(df);
    let mut series: Vec<Vec<f64>> = Vec::with_capacity(columns.len());
    for name in &columns {
        series.push(column_as_f64(df, name)?);
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix { columns, values })
}

/// Pearson correlation coefficient. NaN when either side is constant or
/// the lengths differ.
pub(crate) fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return f64::NAN;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Sample standard deviation (n-1 denominator).
fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

/// Linear-interpolation quantile over an already sorted slice.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== describe tests ====================

    #[test]
    fn test_describe_basic() {
        let df = df![
            "popularity" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
            "artists" => ["a", "b", "c", "d", "e"],
        ]
        .unwrap();

        let stats = describe(&df).unwrap();

        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.name, "popularity");
        assert_eq!(s.count, 5);
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert!((s.std - 1.5811).abs() < 1e-3);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q50, 3.0);
        assert_eq!(s.max, 5.0);
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile_sorted(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.50) - 2.5).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_single_value() {
        assert_eq!(quantile_sorted(&[7.0], 0.25), 7.0);
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect_positive() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [10.0, 20.0, 30.0, 40.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [3.0, 2.0, 1.0];
        assert!((pearson(&xs, &ys) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_is_nan() {
        let xs = [1.0, 1.0, 1.0];
        let ys = [1.0, 2.0, 3.0];
        assert!(pearson(&xs, &ys).is_nan());
    }

    #[test]
    fn test_pearson_length_mismatch_is_nan() {
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    // ==================== correlation_matrix tests ====================

    #[test]
    fn test_correlation_matrix_symmetric_with_unit_diagonal() {
        let df = df![
            "a" => [1.0f64, 2.0, 3.0, 4.0],
            "b" => [2.0f64, 4.0, 6.0, 8.0],
            "c" => [4.0f64, 3.0, 2.0, 1.0],
        ]
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();

        assert_eq!(matrix.columns.len(), 3);
        for i in 0..3 {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            }
        }
        assert!((matrix.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ranking_against_target() {
        let df = df![
            "popularity" => [1.0f64, 2.0, 3.0, 4.0],
            "energy" => [4.0f64, 3.0, 2.0, 1.0],
            "tempo" => [1.0f64, 2.0, 3.0, 5.0],
        ]
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        let ranking = matrix.ranking_against("popularity");

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].0, "tempo");
        assert_eq!(ranking[1].0, "energy");
        assert!(ranking[0].1 > ranking[1].1);
    }

    #[test]
    fn test_ranking_drops_undefined_pairs() {
        let df = df![
            "popularity" => [1.0f64, 2.0, 3.0],
            "constant" => [5.0f64, 5.0, 5.0],
        ]
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        let ranking = matrix.ranking_against("popularity");

        assert!(ranking.is_empty());
    }
}
