//! Numeric scaling functions.

use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Outcome of scaling a single column.
pub(crate) struct ScaleReport {
    pub min: f64,
    pub max: f64,
    /// True when min == max, in which case every value maps to 0.0.
    pub constant: bool,
}

/// Min-max scale a numeric series to `[0, 1]`.
///
/// A constant column (min == max) would divide by zero, so it maps to all
/// zeros instead. Returns the scaled series plus the observed bounds.
pub(crate) fn min_max_scale(series: &Series) -> Result<(Series, ScaleReport)> {
    let floats = series.cast(&DataType::Float64)?;
    let ca = floats.f64()?;

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut seen = false;
    for value in ca.into_iter().flatten() {
        if value.is_nan() {
            continue;
        }
        seen = true;
        min = min.min(value);
        max = max.max(value);
    }
    if !seen {
        return Err(PipelineError::NoValidValues(series.name().to_string()));
    }

    let range = max - min;
    let constant = range == 0.0;
    let values: Vec<Option<f64>> = ca
        .into_iter()
        .map(|opt| {
            opt.map(|v| {
                if constant {
                    0.0
                } else {
                    (v - min) / range
                }
            })
        })
        .collect();

    let scaled = Series::new(series.name().clone(), values);
    Ok((scaled, ScaleReport { min, max, constant }))
}
