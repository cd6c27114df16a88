//! Exploratory data analysis stage.
//!
//! Produces two markdown reports (descriptive statistics, correlation with
//! the target) and a set of PNG charts. The target column is required;
//! every other chart degrades to a recorded skip when its source column is
//! missing, so a partial dataset still yields a complete report run.

mod charts;
pub mod statistics;

pub use statistics::{correlation_matrix, describe, ColumnStats, CorrelationMatrix};

use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::schema::{ARTISTS_COLUMN, GENRE_ENCODED_COLUMN, TARGET_COLUMN, TRACK_GENRE_COLUMN};
use crate::types::EdaArtifacts;
use crate::utils::{column_as_f64, column_labels};

/// Bin count for the target distribution histogram.
pub const HISTOGRAM_BINS: usize = 30;
/// How many groups the "top ..." bar charts keep.
pub const TOP_N: usize = 10;

/// EDA report generator.
pub struct EdaReporter {
    output_dir: PathBuf,
    render_charts: bool,
}

impl EdaReporter {
    /// Create a reporter writing into `output_dir`. With `render_charts`
    /// off only the markdown reports are produced.
    pub fn new(output_dir: impl Into<PathBuf>, render_charts: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            render_charts,
        }
    }

    /// Run the full analysis over an already-transformed frame.
    pub fn run(&self, df: &DataFrame) -> Result<EdaArtifacts> {
        info!(
            "Running EDA over {} rows x {} columns",
            df.height(),
            df.width()
        );
        if df.column(TARGET_COLUMN).is_err() {
            return Err(PipelineError::ColumnNotFound(TARGET_COLUMN.to_string()));
        }
        fs::create_dir_all(&self.output_dir)?;
        let mut artifacts = EdaArtifacts::default();

        let stats = statistics::describe(df)?;
        let path = self.write_markdown("desc_stats.md", &render_describe_markdown(&stats))?;
        artifacts.add_written(path);

        let matrix = statistics::correlation_matrix(df)?;
        let path = self.write_markdown(
            "popularity_corr.md",
            &render_correlation_markdown(&matrix, TARGET_COLUMN),
        )?;
        artifacts.add_written(path);

        // Resolved before the render toggle so the diagnostic is always logged.
        let genre_column = self.resolve_genre_column(df, &mut artifacts);

        if !self.render_charts {
            info!("Chart rendering disabled; markdown reports only");
            artifacts.add_skipped("charts: rendering disabled");
            return Ok(artifacts);
        }

        let popularity = column_as_f64(df, TARGET_COLUMN)?;
        // Grouped charts pair target values with row labels, which only
        // works when the target has no nulls.
        let aligned = popularity.len() == df.height();

        let path = self.output_dir.join("corr_matrix.png");
        charts::heatmap(&path, &matrix)?;
        artifacts.add_written(path);

        let path = self.output_dir.join("popularity_histogram.png");
        charts::histogram(&path, &popularity, TARGET_COLUMN, HISTOGRAM_BINS)?;
        artifacts.add_written(path);

        for feature in ["instrumentalness", "loudness"] {
            let chart_name = format!("scatter_{feature}_popularity");
            if df.column(feature).is_err() {
                artifacts.add_skipped(format!("{chart_name}: '{feature}' absent"));
                continue;
            }
            let xs = column_as_f64(df, feature)?;
            if xs.len() != popularity.len() {
                artifacts.add_skipped(format!("{chart_name}: misaligned rows"));
                continue;
            }
            let path = self.output_dir.join(format!("{chart_name}.png"));
            charts::scatter(
                &path,
                &xs,
                &popularity,
                feature,
                TARGET_COLUMN,
                &format!("{feature} vs popularity"),
            )?;
            artifacts.add_written(path);
        }

        if df.column("time_signature").is_ok() && aligned {
            let groups = group_values(df, "time_signature", &popularity)?;
            let path = self.output_dir.join("boxplot_time_signature_popularity.png");
            charts::grouped_boxplot(
                &path,
                &groups,
                "time_signature",
                TARGET_COLUMN,
                "Popularity by time signature",
            )?;
            artifacts.add_written(path);
        } else {
            artifacts
                .add_skipped("boxplot_time_signature_popularity: 'time_signature' unavailable");
        }

        if df.column(ARTISTS_COLUMN).is_ok() && aligned {
            let raw = column_labels(df, ARTISTS_COLUMN)?;
            let main: Vec<String> = raw.iter().map(|a| main_artist(a).to_string()).collect();
            let bars = top_mean_by_group(&main, &popularity, TOP_N);
            let path = self.output_dir.join("barplot_top_artists_popularity.png");
            charts::bar_chart(
                &path,
                &bars,
                "main_artist",
                TARGET_COLUMN,
                "Top 10 artists by mean popularity",
            )?;
            artifacts.add_written(path);
        } else {
            warn!("No usable '{}' column; skipping artists chart", ARTISTS_COLUMN);
            artifacts.add_skipped(format!(
                "barplot_top_artists_popularity: '{ARTISTS_COLUMN}' unavailable"
            ));
        }

        if let Some(column) = genre_column {
            if aligned {
                let labels = column_labels(df, &column)?;
                let bars = top_mean_by_group(&labels, &popularity, TOP_N);
                let path = self.output_dir.join("barplot_top_genres_popularity.png");
                charts::bar_chart(
                    &path,
                    &bars,
                    &column,
                    TARGET_COLUMN,
                    "Top 10 genres by mean popularity",
                )?;
                artifacts.add_written(path);
            } else {
                artifacts.add_skipped("barplot_top_genres_popularity: misaligned rows");
            }
        }

        info!("EDA complete; {} artifact(s) written", artifacts.written.len());
        Ok(artifacts)
    }

    /// Pick the genre column for the top-genres chart: the readable labels
    /// when present, the encoded codes as a fallback, otherwise none.
    fn resolve_genre_column(&self, df: &DataFrame, artifacts: &mut EdaArtifacts) -> Option<String> {
        if df.column(TRACK_GENRE_COLUMN).is_ok() {
            Some(TRACK_GENRE_COLUMN.to_string())
        } else if df.column(GENRE_ENCODED_COLUMN).is_ok() {
            debug!("Using '{}' labels for the genre chart", GENRE_ENCODED_COLUMN);
            Some(GENRE_ENCODED_COLUMN.to_string())
        } else {
            warn!("No genre column available for the top genres chart");
            artifacts.add_skipped("barplot_top_genres_popularity: no genre column available");
            None
        }
    }

    fn write_markdown(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        let mut file = File::create(&path)?;
        file.write_all(content.as_bytes())?;
        info!("Report saved: {}", path.display());
        Ok(path)
    }
}

/// First comma-separated token of a collaboration string.
fn main_artist(raw: &str) -> &str {
    raw.split(',').next().unwrap_or(raw).trim()
}

/// Mean of `values` per label, top `limit` means first. Ties break on the
/// label so the output is deterministic.
fn top_mean_by_group(labels: &[String], values: &[f64], limit: usize) -> Vec<(String, f64)> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for (label, value) in labels.iter().zip(values) {
        let entry = sums.entry(label.as_str()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let mut means: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(label, (sum, count))| (label.to_string(), sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    means.truncate(limit);
    means
}

/// Values grouped by the rendered labels of `group_column`, groups ordered
/// numerically when the labels parse as numbers.
fn group_values(
    df: &DataFrame,
    group_column: &str,
    values: &[f64],
) -> Result<Vec<(String, Vec<f64>)>> {
    let labels = column_labels(df, group_column)?;
    if labels.len() != values.len() {
        return Err(PipelineError::ReportGenerationFailed(format!(
            "grouping by '{group_column}' needs aligned rows"
        )));
    }

    let mut map: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (label, value) in labels.into_iter().zip(values) {
        map.entry(label).or_default().push(*value);
    }

    let mut groups: Vec<(String, Vec<f64>)> = map.into_iter().collect();
    groups.sort_by(|a, b| match (a.0.parse::<f64>(), b.0.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.0.cmp(&b.0),
    });
    Ok(groups)
}

/// Markdown table of describe statistics, one row per numeric column.
fn render_describe_markdown(stats: &[ColumnStats]) -> String {
    let mut out = String::from("## Descriptive Statistics\n\n");
    out.push_str("| column | count | mean | std | min | 25% | 50% | 75% | max |\n");
    out.push_str("|---|---|---|---|---|---|---|---|---|\n");
    for s in stats {
        out.push_str(&format!(
            "| {} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |\n",
            s.name, s.count, s.mean, s.std, s.min, s.q25, s.q50, s.q75, s.max
        ));
    }
    out
}

/// Markdown ranking of correlations against the target, strongest first.
/// The target's own row (always 1.0) leads the table.
fn render_correlation_markdown(matrix: &CorrelationMatrix, target: &str) -> String {
    let mut out = format!("## Correlation with {target}\n\n");
    out.push_str("| column | correlation |\n|---|---|\n");
    if matrix.columns.iter().any(|c| c == target) {
        out.push_str(&format!("| {target} | 1.0000 |\n"));
        for (name, r) in matrix.ranking_against(target) {
            out.push_str(&format!("| {name} | {r:.4} |\n"));
        }
    }
    out
}
