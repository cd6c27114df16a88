//! Column contracts shared across pipeline stages.
//!
//! The cleaner, transformer and modeler all agree on column names through
//! the constants here rather than through scattered string literals. The
//! modeling feature set is a named, versioned [`FeatureSchema`] checked at
//! the modeler's entry instead of being silently filtered.

use polars::prelude::*;

/// The regression target produced by the upstream dataset.
pub const TARGET_COLUMN: &str = "popularity";

/// Identifier-like columns removed by the cleaner. Absence is ignored.
pub const DROPPED_COLUMNS: &[&str] = &["track_id", "album_name"];

/// Millisecond duration column consumed by the transformer.
pub const DURATION_MS_COLUMN: &str = "duration_ms";

/// Second-resolution duration column derived by the transformer.
pub const DURATION_S_COLUMN: &str = "duration_s";

/// Binary modality column, one-hot encoded with prefix `mode_`.
pub const MODE_COLUMN: &str = "mode";

/// Genre label column; label-encoded into [`GENRE_ENCODED_COLUMN`].
pub const TRACK_GENRE_COLUMN: &str = "track_genre";

/// Integer genre code derived by the transformer.
pub const GENRE_ENCODED_COLUMN: &str = "genre_encoded";

/// Comma-separated artist list; the first token is the "main artist".
pub const ARTISTS_COLUMN: &str = "artists";

/// Columns min-max scaled to [0,1], filtered to those present.
pub const SCALED_COLUMNS: &[&str] = &[
    "popularity",
    "danceability",
    "energy",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_s",
];

/// A named, versioned list of columns a modeling stage expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub name: &'static str,
    pub version: u32,
    pub target: &'static str,
    pub features: &'static [&'static str],
}

/// The feature contract for popularity regression on transformed tracks.
pub const MODEL_SCHEMA_V1: FeatureSchema = FeatureSchema {
    name: "track-popularity",
    version: 1,
    target: TARGET_COLUMN,
    features: &[
        "danceability",
        "energy",
        "key",
        "loudness",
        "speechiness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "valence",
        "tempo",
        "time_signature",
        "duration_s",
        "explicit",
        "mode_1",
        "genre_encoded",
    ],
};

/// Outcome of checking a dataset against a [`FeatureSchema`].
#[derive(Debug, Clone)]
pub struct SchemaCheck {
    /// Feature columns found in the dataset, in schema order.
    pub present: Vec<String>,
    /// Feature columns the dataset lacks, in schema order.
    pub missing: Vec<String>,
    /// Whether the target column is present.
    pub target_present: bool,
}

impl FeatureSchema {
    /// Schema identifier of the form `name/vN`.
    pub fn qualified_name(&self) -> String {
        format!("{}/v{}", self.name, self.version)
    }

    /// Check which schema columns the dataset provides.
    pub fn check(&self, df: &DataFrame) -> SchemaCheck {
        let mut present = Vec::new();
        let mut missing = Vec::new();
        for &feature in self.features {
            if df.column(feature).is_ok() {
                present.push(feature.to_string());
            } else {
                missing.push(feature.to_string());
            }
        }
        SchemaCheck {
            present,
            missing,
            target_present: df.column(self.target).is_ok(),
        }
    }
}

impl SchemaCheck {
    /// True when every feature column and the target are present.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.target_present
    }
}
