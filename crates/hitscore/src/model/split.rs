//! Deterministic train/test splitting.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Split a frame into shuffled train and test partitions.
///
/// The shuffle is driven entirely by `seed`, so the same frame, fraction
/// and seed always produce the same partitions. The test partition gets
/// `ceil(rows * test_fraction)` rows, clamped so both sides stay non-empty.
pub fn train_test_split(
    df: &DataFrame,
    test_fraction: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    let rows = df.height();
    if rows < 2 {
        return Err(PipelineError::TrainingFailed(format!(
            "need at least 2 rows to split, got {rows}"
        )));
    }

    let mut indices: Vec<IdxSize> = (0..rows as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_rows = ((rows as f64 * test_fraction).ceil() as usize).clamp(1, rows - 1);
    let (test_idx, train_idx) = indices.split_at(test_rows);
    debug!(
        "Split {} rows into {} train / {} test (seed {})",
        rows,
        train_idx.len(),
        test_idx.len(),
        seed
    );

    let train = df.take(&IdxCa::from_vec("idx".into(), train_idx.to_vec()))?;
    let test = df.take(&IdxCa::from_vec("idx".into(), test_idx.to_vec()))?;
    Ok((train, test))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered_frame(rows: usize) -> DataFrame {
        let ids: Vec<i64> = (0..rows as i64).collect();
        df!["row_id" => ids].unwrap()
    }

    #[test]
    fn test_split_sizes_80_20() {
        let df = numbered_frame(10);
        let (train, test) = train_test_split(&df, 0.2, 42).unwrap();
        assert_eq!(train.height(), 8);
        assert_eq!(test.height(), 2);
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let df = numbered_frame(11);
        let (train, test) = train_test_split(&df, 0.2, 42).unwrap();
        // ceil(11 * 0.2) = 3
        assert_eq!(test.height(), 3);
        assert_eq!(train.height(), 8);
    }

    #[test]
    fn test_split_keeps_both_sides_non_empty() {
        let df = numbered_frame(2);
        let (train, test) = train_test_split(&df, 0.01, 7).unwrap();
        assert_eq!(train.height(), 1);
        assert_eq!(test.height(), 1);

        let (train, test) = train_test_split(&df, 0.99, 7).unwrap();
        assert_eq!(train.height(), 1);
        assert_eq!(test.height(), 1);
    }

    #[test]
    fn test_split_rejects_single_row() {
        let df = numbered_frame(1);
        let err = train_test_split(&df, 0.2, 42).unwrap_err();
        assert!(matches!(err, PipelineError::TrainingFailed(_)));
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let df = numbered_frame(20);
        let (train_a, test_a) = train_test_split(&df, 0.2, 42).unwrap();
        let (train_b, test_b) = train_test_split(&df, 0.2, 42).unwrap();
        assert!(train_a.equals(&train_b));
        assert!(test_a.equals(&test_b));
    }

    #[test]
    fn test_split_partitions_are_disjoint_and_complete() {
        let df = numbered_frame(25);
        let (train, test) = train_test_split(&df, 0.2, 42).unwrap();

        let mut seen: Vec<i64> = Vec::new();
        for part in [&train, &test] {
            let col = part.column("row_id").unwrap().as_materialized_series().clone();
            seen.extend(col.i64().unwrap().into_no_null_iter());
        }
        seen.sort_unstable();
        let expected: Vec<i64> = (0..25).collect();
        assert_eq!(seen, expected);
    }
}
