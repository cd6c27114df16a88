//! Built-in demo dataset.
//!
//! Five hand-written tracks with a known schema, used when the caller
//! opts in to running without a real input file. Two values are
//! deliberately missing (one numeric, one categorical) so the cleaning
//! stage always has imputation work to do.

use polars::prelude::*;

use crate::error::Result;

/// Build the 5-row demo dataset.
///
/// `popularity` is missing at row index 1 and `artists` at row index 3.
pub fn demo_tracks() -> Result<DataFrame> {
    let df = df![
        "track_id" => ["t1", "t2", "t3", "t4", "t5"],
        "artists" => [Some("Artist A"), Some("Artist B"), Some("Artist C"), None, Some("Artist E")],
        "album_name" => ["Album X", "Album Y", "Album Z", "Album W", "Album V"],
        "track_name" => ["Song 1", "Song 2", "Song 3", "Song 4", "Song 5"],
        "popularity" => [Some(80.0f64), None, Some(90.0), Some(40.0), Some(75.0)],
        "duration_ms" => [200000i64, 180000, 250000, 150000, 210000],
        "explicit" => [true, false, true, false, false],
        "danceability" => [0.7f64, 0.5, 0.9, 0.3, 0.6],
        "energy" => [0.8f64, 0.4, 0.95, 0.2, 0.7],
        "loudness" => [-5.0f64, -10.0, -3.0, -15.0, -6.0],
        "mode" => [1i64, 0, 1, 0, 1],
        "speechiness" => [0.05f64, 0.4, 0.1, 0.8, 0.08],
        "acousticness" => [0.1f64, 0.8, 0.05, 0.9, 0.2],
        "instrumentalness" => [0.0f64, 0.7, 0.0, 0.0, 0.0],
        "liveness" => [0.1f64, 0.9, 0.2, 0.15, 0.3],
        "valence" => [0.9f64, 0.3, 0.8, 0.1, 0.7],
        "tempo" => [120.0f64, 90.0, 140.0, 70.0, 110.0],
        "time_signature" => [4i64, 4, 3, 4, 4],
        "track_genre" => ["pop", "classical", "pop", "hip-hop", "rock"],
    ]?;
    Ok(df)
}
