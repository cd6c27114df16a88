//! CLI entry point for the track analytics pipeline.

use anyhow::{anyhow, Result};
use clap::Parser;
use hitscore::{Pipeline, PipelineConfig, PipelineOutcome};
use std::path::Path;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Track popularity ETL, EDA and modeling pipeline",
    long_about = "Batch pipeline over a track-metadata CSV: cleaning, feature\n\
                  transformation, markdown and PNG reports, and three popularity\n\
                  regressors evaluated on a held-out split.\n\n\
                  EXAMPLES:\n  \
                  # Full run into ./results\n  \
                  hitscore -i dataset.csv\n\n  \
                  # Use the built-in 5-row demo dataset if the file is missing\n  \
                  hitscore -i dataset.csv --demo\n\n  \
                  # Reports without charts, custom output directory\n  \
                  hitscore -i dataset.csv -o out --no-charts"
)]
struct Args {
    /// Path to the track-metadata CSV
    #[arg(short, long)]
    input: String,

    /// Output directory for documents, charts and the results JSON
    #[arg(short, long, default_value = "results")]
    output: String,

    /// Substitute the built-in demo dataset when the input file is missing
    #[arg(long)]
    demo: bool,

    /// Seed for the train/test shuffle and the forest bootstrap
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Held-out test fraction (strictly between 0 and 1)
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Number of random-forest trees
    #[arg(long, default_value = "100")]
    forest_trees: usize,

    /// Number of gradient-boosting rounds
    #[arg(long, default_value = "100")]
    boosting_rounds: usize,

    /// Gradient-boosting learning rate
    #[arg(long, default_value = "0.1")]
    learning_rate: f64,

    /// Abort modeling when feature-schema columns are missing
    #[arg(long)]
    strict_schema: bool,

    /// Skip PNG chart rendering (markdown and JSON are still written)
    #[arg(long)]
    no_charts: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run outcome as JSON to stdout
    ///
    /// Disables all progress logs; only the JSON document is written to
    /// stdout. Useful for piping: `hitscore -i data.csv --json | jq .model_report`
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// only contains the JSON document.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = PipelineConfig::builder()
        .output_dir(&args.output)
        .demo_fallback(args.demo)
        .seed(args.seed)
        .test_fraction(args.test_fraction)
        .forest_trees(args.forest_trees)
        .boosting_rounds(args.boosting_rounds)
        .learning_rate(args.learning_rate)
        .strict_schema(args.strict_schema)
        .render_charts(!args.no_charts)
        .build()?;

    let pipeline = Pipeline::builder().config(config).build()?;

    info!("{}", "=".repeat(80));
    info!("Starting track popularity pipeline...");
    info!("{}", "=".repeat(80));

    match pipeline.run(Path::new(&args.input)) {
        Ok(outcome) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_summary(&outcome, &args);
            }
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

/// Print a human-readable summary of the run.
///
/// Uses `println!` intentionally: this is the primary CLI output and
/// should be visible regardless of log level.
fn print_summary(outcome: &PipelineOutcome, args: &Args) {
    let etl = &outcome.etl_summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("PIPELINE COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, etl.rows_before, etl.columns_before
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        outcome.transformed_path.display(),
        etl.rows_after,
        etl.columns_after
    );
    println!();

    println!("ETL Steps ({} ms):", etl.duration_ms);
    for entry in &etl.entries {
        println!("  - {}: {}", entry.step, entry.outcome);
    }
    if !etl.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &etl.warnings {
            println!("  ! {}", warning);
        }
    }
    println!();

    println!(
        "EDA: {} artifact(s) written, {} skipped",
        outcome.eda.written.len(),
        outcome.eda.skipped.len()
    );
    for reason in &outcome.eda.skipped {
        println!("  ~ {}", reason);
    }
    println!();

    let report = &outcome.model_report;
    println!(
        "Models (target '{}', {} train / {} test rows, seed {}):",
        report.target, report.split.train_rows, report.split.test_rows, report.split.seed
    );
    for model in &report.models {
        let r2 = model
            .r2
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "undefined".to_string());
        println!("  {:<20} r2 {:>9}   rmse {:.4}", model.name, r2, model.rmse);
        for fi in model.top_importances(5) {
            println!("    {:<24} {:.4}", fi.feature, fi.importance);
        }
    }
    if let Some(best) = report.best_by_rmse() {
        println!();
        println!("Best by RMSE: {}", best.name);
    }
    println!();

    println!("Total runtime: {} ms", outcome.duration_ms);
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
