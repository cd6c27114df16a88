//! Categorical encoding functions for feature engineering.

use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::utils::value_label;

/// One-hot encode `column` into indicator columns named `{prefix}{category}`.
///
/// Categories are ordered alphabetically; with `drop_first` the first one is
/// omitted so k categories produce k-1 columns. Null cells belong to no
/// category and get all-zero indicators. The source column is dropped.
/// Returns the names of the columns that were created.
pub(crate) fn one_hot_encode(
    df: &mut DataFrame,
    column: &str,
    prefix: &str,
    drop_first: bool,
) -> Result<Vec<String>> {
    let series = df.column(column)?.as_materialized_series().clone();

    let mut labels: Vec<Option<String>> = Vec::with_capacity(series.len());
    for idx in 0..series.len() {
        labels.push(match series.get(idx)? {
            AnyValue::Null => None,
            av => Some(value_label(&av)),
        });
    }

    let categories: BTreeSet<&String> = labels.iter().flatten().collect();
    let kept: Vec<String> = categories
        .into_iter()
        .skip(usize::from(drop_first))
        .cloned()
        .collect();

    let mut created = Vec::with_capacity(kept.len());
    for category in &kept {
        let values: Vec<i64> = labels
            .iter()
            .map(|label| i64::from(label.as_deref() == Some(category.as_str())))
            .collect();
        let name = format!("{prefix}{category}");
        df.with_column(Series::new(name.as_str().into(), values))?;
        created.push(name);
    }

    *df = df.drop(column)?;
    Ok(created)
}

/// Label-encode `column` into `target`: distinct values sorted alphabetically
/// map to integer codes `0..n-1`. The source column is kept.
///
/// Returns the ordered class list so callers can log the mapping.
pub(crate) fn label_encode(df: &mut DataFrame, column: &str, target: &str) -> Result<Vec<String>> {
    let series = df.column(column)?.as_materialized_series().clone();
    let ca = series.str()?;

    let classes: Vec<String> = ca
        .into_iter()
        .flatten()
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mapping: HashMap<&str, i64> = classes
        .iter()
        .enumerate()
        .map(|(code, class)| (class.as_str(), code as i64))
        .collect();

    let codes: Vec<Option<i64>> = ca
        .into_iter()
        .map(|opt| opt.map(|value| mapping[value]))
        .collect();

    df.with_column(Series::new(target.into(), codes))?;
    Ok(classes)
}
