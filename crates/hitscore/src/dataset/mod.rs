//! Dataset extraction.
//!
//! Loads the input CSV into a polars `DataFrame`, trying progressively more
//! forgiving parse strategies (artist fields full of stray quotes are the
//! usual culprit). A missing input file is a hard error unless the caller
//! opted in to the demo fixture.

use std::path::Path;

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::types::EtlSummary;

pub mod fixture;

pub use fixture::demo_tracks;

/// Where the extracted dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSource {
    /// Parsed from the input file.
    File,
    /// The built-in 5-row demo dataset.
    DemoFixture,
}

/// Reads the input dataset and records initial shape in the ETL summary.
pub struct Extractor;

impl Extractor {
    /// Load the dataset at `path`.
    ///
    /// When the file does not exist and `demo_fallback` is set, the demo
    /// fixture substitutes for it; otherwise the absence is an error. Any
    /// other read failure aborts extraction.
    pub fn extract(
        path: &Path,
        demo_fallback: bool,
        summary: &mut EtlSummary,
    ) -> Result<(DataFrame, DatasetSource)> {
        if !path.exists() {
            if !demo_fallback {
                return Err(PipelineError::InputNotFound(path.to_path_buf()));
            }
            info!(
                "Input file {} not found, substituting the demo dataset",
                path.display()
            );
            let df = fixture::demo_tracks()?;
            summary.record(
                "extract",
                format!(
                    "input missing, demo fixture substituted ({} rows x {} columns)",
                    df.height(),
                    df.width()
                ),
            );
            return Ok((df, DatasetSource::DemoFixture));
        }

        let df = load_csv_with_fallbacks(path)?;
        summary.record(
            "extract",
            format!(
                "loaded {} ({} rows x {} columns)",
                path.display(),
                df.height(),
                df.width()
            ),
        );
        Ok((df, DatasetSource::File))
    }
}

/// Load CSV with multiple fallback strategies.
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: pre-clean content
    let content = std::fs::read_to_string(path)?;
    let cleaned = clean_csv_content(&content);
    let cursor = std::io::Cursor::new(cleaned);

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(|e| PipelineError::ExtractionFailed(format!("all parse strategies failed: {e}")))
}

/// Collapse doubled quotes and drop blank lines before a last-resort parse.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_without_fallback_is_an_error() {
        let mut summary = EtlSummary::new();
        let result = Extractor::extract(Path::new("no_such_file.csv"), false, &mut summary);
        assert!(matches!(result, Err(PipelineError::InputNotFound(_))));
        assert!(summary.entries.is_empty());
    }

    #[test]
    fn test_missing_file_with_fallback_uses_fixture() {
        let mut summary = EtlSummary::new();
        let (df, source) =
            Extractor::extract(Path::new("no_such_file.csv"), true, &mut summary).unwrap();

        assert_eq!(source, DatasetSource::DemoFixture);
        assert_eq!(df.height(), 5);
        assert_eq!(summary.entries.len(), 1);
        assert!(summary.entries[0].outcome.contains("demo fixture"));
    }

    #[test]
    fn test_extract_reads_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "track_name,popularity,tempo").unwrap();
        writeln!(file, "Song 1,80,120.0").unwrap();
        writeln!(file, "Song 2,75,90.5").unwrap();

        let mut summary = EtlSummary::new();
        let (df, source) = Extractor::extract(&path, false, &mut summary).unwrap();

        assert_eq!(source, DatasetSource::File);
        assert_eq!(df.shape(), (2, 3));
        assert!(summary.entries[0].outcome.contains("2 rows"));
    }

    #[test]
    fn test_clean_csv_content() {
        let content = "a,b\n\"\"quoted\"\",1\n\n2,3\n";
        let cleaned = clean_csv_content(content);
        assert_eq!(cleaned, "a,b\n\"quoted\",1\n2,3");
    }
}
