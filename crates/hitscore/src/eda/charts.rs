//! Chart rendering with plotters.
//!
//! Every function here writes a single PNG and knows nothing about the
//! DataFrame; callers pass plain slices so the drawing code stays testable.

use plotters::prelude::*;
use std::path::Path;

use super::statistics::{quantile_sorted, CorrelationMatrix};
use crate::error::{PipelineError, Result};

pub(crate) const CHART_WIDTH: u32 = 1000;
pub(crate) const CHART_HEIGHT: u32 = 800;

// matplotlib's tab:blue, so the output matches the usual EDA palette
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

fn chart_err(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::ReportGenerationFailed(err.to_string())
}

/// Correlation heatmap over the full matrix.
pub(crate) fn heatmap(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    let n = matrix.columns.len();
    if n == 0 {
        return Err(PipelineError::ReportGenerationFailed(
            "correlation matrix is empty".to_string(),
        ));
    }

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation matrix", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(130)
        .y_label_area_size(140)
        .build_cartesian_2d(0..n as i32, 0..n as i32)
        .map_err(chart_err)?;

    let x_names = matrix.columns.clone();
    let y_names = matrix.columns.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_label_formatter(&|idx: &i32| {
            x_names.get(*idx as usize).cloned().unwrap_or_default()
        })
        .y_label_formatter(&|idx: &i32| {
            let row = n as i32 - 1 - *idx;
            y_names.get(row as usize).cloned().unwrap_or_default()
        })
        .draw()
        .map_err(chart_err)?;

    let values = &matrix.values;
    let cells = (0..n).flat_map(|row| {
        (0..n).map(move |col| {
            Rectangle::new(
                [
                    (col as i32, (n - 1 - row) as i32),
                    (col as i32 + 1, (n - row) as i32),
                ],
                correlation_color(values[row][col]).filled(),
            )
        })
    });
    chart.draw_series(cells).map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Histogram with a fixed number of equal-width bins.
pub(crate) fn histogram(path: &Path, values: &[f64], label: &str, bins: usize) -> Result<()> {
    let (min, max) =
        value_bounds(values).ok_or_else(|| PipelineError::NoValidValues(label.to_string()))?;
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let counts = bin_counts(values, bins, lo, hi);
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as u32;
    let bin_width = (hi - lo) / bins as f64;

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {label}"), ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(lo..hi, 0u32..(max_count + max_count / 10 + 1))
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc(label)
        .y_desc("count")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(counts.iter().enumerate().filter(|(_, c)| **c > 0).map(
            |(i, &count)| {
                let x0 = lo + bin_width * i as f64;
                Rectangle::new([(x0, 0u32), (x0 + bin_width, count as u32)], BAR_COLOR.filled())
            },
        ))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Scatter plot of two aligned series.
pub(crate) fn scatter(
    path: &Path,
    xs: &[f64],
    ys: &[f64],
    x_label: &str,
    y_label: &str,
    title: &str,
) -> Result<()> {
    if xs.len() != ys.len() || xs.is_empty() {
        return Err(PipelineError::ReportGenerationFailed(format!(
            "scatter '{title}' needs two aligned non-empty series"
        )));
    }
    let (xmin, xmax) =
        value_bounds(xs).ok_or_else(|| PipelineError::NoValidValues(x_label.to_string()))?;
    let (ymin, ymax) =
        value_bounds(ys).ok_or_else(|| PipelineError::NoValidValues(y_label.to_string()))?;
    let (xlo, xhi) = padded(xmin, xmax);
    let (ylo, yhi) = padded(ymin, ymax);

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(xlo..xhi, ylo..yhi)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            xs.iter()
                .zip(ys)
                .filter(|(x, y)| !x.is_nan() && !y.is_nan())
                .map(|(&x, &y)| Circle::new((x, y), 3, BAR_COLOR.mix(0.5).filled())),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Box-and-whisker plot, one box per group in the given order.
pub(crate) fn grouped_boxplot(
    path: &Path,
    groups: &[(String, Vec<f64>)],
    x_label: &str,
    y_label: &str,
    title: &str,
) -> Result<()> {
    if groups.is_empty() {
        return Err(PipelineError::ReportGenerationFailed(format!(
            "boxplot '{title}' has no groups"
        )));
    }

    let all: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let (ymin, ymax) =
        value_bounds(&all).ok_or_else(|| PipelineError::NoValidValues(y_label.to_string()))?;
    let (ylo, yhi) = padded(ymin, ymax);
    let n = groups.len();

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), ylo..yhi)
        .map_err(chart_err)?;

    let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();
    let fmt = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 0.01 && idx >= 0.0 && (idx as usize) < labels.len() {
            labels[idx as usize].clone()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .x_labels(n)
        .x_desc(x_label)
        .y_desc(y_label)
        .x_label_formatter(&fmt)
        .draw()
        .map_err(chart_err)?;

    for (i, (_, values)) in groups.iter().enumerate() {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            continue;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q2 = quantile_sorted(&sorted, 0.50);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;
        let whisker_lo = sorted
            .iter()
            .copied()
            .find(|v| *v >= lo_fence)
            .unwrap_or(q1);
        let whisker_hi = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= hi_fence)
            .unwrap_or(q3);
        let xc = i as f64;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(xc - 0.3, q1), (xc + 0.3, q3)],
                BAR_COLOR.mix(0.35).filled(),
            )))
            .map_err(chart_err)?;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(xc - 0.3, q1), (xc + 0.3, q3)],
                &BLACK,
            )))
            .map_err(chart_err)?;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(xc - 0.3, q2), (xc + 0.3, q2)],
                BLACK.stroke_width(2),
            )))
            .map_err(chart_err)?;
        for (from, to) in [(q3, whisker_hi), (whisker_lo, q1)] {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(xc, from), (xc, to)],
                    &BLACK,
                )))
                .map_err(chart_err)?;
        }
        for w in [whisker_lo, whisker_hi] {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(xc - 0.15, w), (xc + 0.15, w)],
                    &BLACK,
                )))
                .map_err(chart_err)?;
        }
        chart
            .draw_series(
                sorted
                    .iter()
                    .filter(|v| **v < lo_fence || **v > hi_fence)
                    .map(|&v| Circle::new((xc, v), 2, &BLACK)),
            )
            .map_err(chart_err)?;
    }

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Vertical bar chart with one bar per labelled value.
pub(crate) fn bar_chart(
    path: &Path,
    bars: &[(String, f64)],
    x_label: &str,
    y_label: &str,
    title: &str,
) -> Result<()> {
    if bars.is_empty() {
        return Err(PipelineError::ReportGenerationFailed(format!(
            "bar chart '{title}' has no bars"
        )));
    }

    let values: Vec<f64> = bars.iter().map(|(_, v)| *v).collect();
    let (vmin, vmax) =
        value_bounds(&values).ok_or_else(|| PipelineError::NoValidValues(y_label.to_string()))?;
    let ylo = vmin.min(0.0);
    let yhi = if vmax == ylo { vmax + 1.0 } else { vmax + (vmax - ylo) * 0.05 };
    let n = bars.len();

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(160)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), ylo..yhi)
        .map_err(chart_err)?;

    let labels: Vec<String> = bars.iter().map(|(name, _)| name.clone()).collect();
    let fmt = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 0.01 && idx >= 0.0 && (idx as usize) < labels.len() {
            labels[idx as usize].clone()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .x_labels(n)
        .x_desc(x_label)
        .y_desc(y_label)
        .x_label_style(
            ("sans-serif", 13)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_label_formatter(&fmt)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let xc = i as f64;
            Rectangle::new([(xc - 0.4, 0.0), (xc + 0.4, *value)], BAR_COLOR.filled())
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Color ramp for correlation values: blue for negative, red for positive,
/// white around zero, gray for undefined.
fn correlation_color(r: f64) -> RGBColor {
    if r.is_nan() {
        return RGBColor(220, 220, 220);
    }
    let r = r.clamp(-1.0, 1.0);
    if r >= 0.0 {
        let fade = (255.0 * (1.0 - r)) as u8;
        RGBColor(255, fade, fade)
    } else {
        let fade = (255.0 * (1.0 + r)) as u8;
        RGBColor(fade, fade, 255)
    }
}

/// Count values into equal-width bins spanning `[min, max]`.
fn bin_counts(values: &[f64], bins: usize, min: f64, max: f64) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    let width = (max - min) / bins as f64;
    if width == 0.0 {
        counts[0] = values.len();
        return counts;
    }
    for &v in values {
        if v.is_nan() || v < min || v > max {
            continue;
        }
        let mut idx = ((v - min) / width) as usize;
        if idx >= bins {
            idx = bins - 1;
        }
        counts[idx] += 1;
    }
    counts
}

/// Finite min/max pair, or None when no usable values exist.
fn value_bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut seen = false;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        seen = true;
        min = min.min(v);
        max = max.max(v);
    }
    seen.then_some((min, max))
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}
