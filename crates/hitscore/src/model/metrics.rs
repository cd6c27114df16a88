//! Regression evaluation metrics.

/// Root mean squared error between true and predicted values.
///
/// Returns 0.0 for empty input; callers guarantee a non-empty test split.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }
    let mse: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}

/// Coefficient of determination.
///
/// `None` when the true values are constant: the total sum of squares is
/// zero and R² is undefined, which a downstream report renders as `null`
/// rather than as a misleading score.
pub fn r2(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return None;
    }
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmse_known_value() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [1.0, 2.0, 5.0];
        // errors 0, 0, 2 -> mse 4/3
        assert!((rmse(&y_true, &y_pred) - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_zero_for_perfect_predictions() {
        let y = [0.3, 0.7, 0.9];
        assert_eq!(rmse(&y, &y), 0.0);
    }

    #[test]
    fn test_r2_perfect_fit_is_one() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2(&y, &y), Some(1.0));
    }

    #[test]
    fn test_r2_mean_predictor_is_zero() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [2.0, 2.0, 2.0];
        let score = r2(&y_true, &y_pred).unwrap();
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn test_r2_undefined_for_constant_target() {
        let y_true = [5.0, 5.0, 5.0];
        let y_pred = [4.0, 5.0, 6.0];
        assert_eq!(r2(&y_true, &y_pred), None);
    }

    #[test]
    fn test_r2_worse_than_mean_is_negative() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [3.0, 2.0, 1.0];
        assert!(r2(&y_true, &y_pred).unwrap() < 0.0);
    }
}
