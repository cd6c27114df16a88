//! Pipeline orchestration: extract, clean, transform, report, model.
//!
//! [`Pipeline`] wires the stages together in a fixed order, carries one
//! [`EtlSummary`] through the ETL stages and bundles every stage's output
//! into a [`PipelineOutcome`].

use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::dataset::{DatasetSource, Extractor};
use crate::eda::EdaReporter;
use crate::error::{Result, ResultExt};
use crate::model::Modeler;
use crate::transform::Transformer;
use crate::types::{EtlSummary, PipelineOutcome};

/// The full track-analytics pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use hitscore::pipeline::Pipeline;
/// use hitscore::config::PipelineConfig;
///
/// let outcome = Pipeline::builder()
///     .config(PipelineConfig::builder().output_dir("results").build()?)
///     .build()?
///     .run("tracks.csv".as_ref())?;
///
/// println!("Best model: {:?}", outcome.model_report.best_by_rmse());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
}

// The pipeline runs inside spawned worker threads in embedding contexts.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Create a pipeline directly from a validated configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage on the dataset at `input`.
    pub fn run(&self, input: &Path) -> Result<PipelineOutcome> {
        let start = Instant::now();
        info!("Starting track analytics pipeline");
        info!("Input: {}", input.display());

        fs::create_dir_all(&self.config.output_dir).context("creating output directory")?;

        let mut summary = EtlSummary::new();

        info!("Step 1: Extracting dataset...");
        let (df, source) = Extractor::extract(input, self.config.demo_fallback, &mut summary)
            .context("extraction stage")?;
        if source == DatasetSource::DemoFixture {
            info!("Input file missing; continuing on the built-in demo dataset");
        }
        summary.rows_before = df.height();
        summary.columns_before = df.width();

        info!("Step 2: Cleaning dataset...");
        let df = DataCleaner::clean(df, &mut summary).context("cleaning stage")?;

        info!("Step 3: Transforming features...");
        let df = Transformer::transform(df, &mut summary).context("transform stage")?;
        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.duration_ms = start.elapsed().as_millis() as u64;

        info!("Step 4: Writing transformed dataset...");
        let transformed_path = self.write_transformed(&df)?;

        info!("Step 5: Generating EDA reports...");
        let reporter = EdaReporter::new(self.config.output_dir.clone(), self.config.render_charts);
        let eda = reporter.run(&df).context("eda stage")?;

        info!("Step 6: Training and evaluating models...");
        let model_report = Modeler::new(&self.config).run(&df).context("modeling stage")?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Pipeline completed in {} ms", duration_ms);

        Ok(PipelineOutcome {
            transformed_path,
            etl_summary: summary,
            eda,
            model_report,
            duration_ms,
        })
    }

    /// Write the cleaned and transformed frame as CSV into the output
    /// directory.
    fn write_transformed(&self, df: &DataFrame) -> Result<PathBuf> {
        let path = self.config.output_dir.join(&self.config.transformed_name);
        let mut file = File::create(&path).context("creating transformed-dataset file")?;
        let mut out = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut out)?;
        info!(
            "Transformed dataset saved: {} ({} rows x {} columns)",
            path.display(),
            df.height(),
            df.width()
        );
        Ok(path)
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Pipeline { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().seed, 42);
        assert!(pipeline.config().render_charts);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        // Builder-validated configs can't be invalid, but deserialized
        // ones can.
        let config: PipelineConfig = serde_json::from_str(
            r#"{
                "output_dir": "results",
                "transformed_name": "t.csv",
                "demo_fallback": false,
                "seed": 42,
                "test_fraction": 1.5,
                "forest_trees": 100,
                "boosting_rounds": 100,
                "learning_rate": 0.1,
                "strict_schema": false,
                "render_charts": true
            }"#,
        )
        .unwrap();

        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_run_missing_input_without_fallback_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();

        let err = Pipeline::new(config)
            .run(Path::new("definitely_missing.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("extraction stage"));
    }
}
