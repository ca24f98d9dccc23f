//! Configuration types for a catalog build.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default Photon reverse-geocoding endpoint.
pub const DEFAULT_GEOCODER_URL: &str = "https://photon.komoot.io/reverse";

/// Which coordinate of a track is reverse geocoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// First recorded point.
    #[default]
    Start,
    /// Mean of all points.
    Centroid,
}

/// Settings for the location resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Reverse-geocoding endpoint taking `lat` and `lon` query parameters.
    pub url: String,

    /// Per-lookup timeout.
    pub timeout: Duration,

    /// Minimum spacing between consecutive network calls.
    pub min_interval: Duration,

    /// Decimal places kept when keying the cache.
    pub cache_precision: u32,

    /// Optional on-disk cache carried across runs.
    pub cache_path: Option<PathBuf>,

    /// Extra attempts after a transient failure.
    pub retries: u32,

    /// Skip network lookups entirely.
    pub offline: bool,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GEOCODER_URL.to_string(),
            timeout: Duration::from_secs(10),
            min_interval: Duration::from_millis(1000),
            cache_precision: 4,
            cache_path: None,
            retries: 1,
            offline: false,
        }
    }
}

/// Settings for one catalog build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory scanned for `.gpx` files.
    pub gpx_dir: PathBuf,

    /// Catalog JSON destination.
    pub output: PathBuf,

    /// Rebuild from scratch instead of extending an existing catalog.
    pub overwrite: bool,

    /// Prefix joined with each file name to form the record's `file`.
    /// Defaults to `gpx_dir` as given.
    pub asset_prefix: Option<String>,

    /// File names containing any of these substrings are ignored.
    pub exclude: Vec<String>,

    /// Coordinate used for the location lookup.
    pub anchor: Anchor,

    pub geocoder: GeocoderConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            gpx_dir: PathBuf::from("assets/gpx"),
            output: PathBuf::from("gpx_courses.json"),
            overwrite: false,
            asset_prefix: None,
            exclude: Vec::new(),
            anchor: Anchor::Start,
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl BuildConfig {
    /// The prefix used for record `file` paths.
    pub fn asset_prefix(&self) -> String {
        self.asset_prefix
            .clone()
            .unwrap_or_else(|| self.gpx_dir.to_string_lossy().into_owned())
    }

    /// Record `file` value for a GPX file name.
    pub fn asset_path(&self, file_name: &str) -> String {
        let prefix = self.asset_prefix();
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{prefix}/{file_name}")
        }
    }

    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclude
            .iter()
            .any(|pattern| !pattern.is_empty() && file_name.contains(pattern.as_str()))
    }
}
