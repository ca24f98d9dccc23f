//! Command-line arguments for the `gpx-courses` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::browse::FilterCriteria;
use crate::config::{Anchor, BuildConfig, DEFAULT_GEOCODER_URL, GeocoderConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a JSON course catalog from GPX tracks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse GPX files and write (or extend) the course catalog
    Build(BuildArgs),
    /// Print the courses of a catalog matching a filter
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Directory containing GPX files
    #[arg(long, default_value = "assets/gpx", value_hint = ValueHint::DirPath)]
    pub gpx_dir: PathBuf,

    /// Output JSON file
    #[arg(short, long, default_value = "gpx_courses.json", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Rebuild the catalog instead of extending the existing one
    #[arg(long)]
    pub overwrite: bool,

    /// Prefix for each course's `file` path (defaults to --gpx-dir)
    #[arg(long)]
    pub asset_prefix: Option<String>,

    /// Ignore files whose name contains this text (repeatable)
    #[arg(long = "exclude", value_name = "TEXT")]
    pub exclude: Vec<String>,

    /// Coordinate used for the location lookup
    #[arg(long, value_enum, default_value_t = Anchor::Start)]
    pub anchor: Anchor,

    /// Photon-compatible reverse geocoding endpoint
    #[arg(long, env = "GPX_COURSES_GEOCODER_URL", default_value = DEFAULT_GEOCODER_URL)]
    pub geocoder_url: String,

    /// Timeout per location lookup, in seconds
    #[arg(long, default_value_t = 10)]
    pub geocode_timeout_secs: u64,

    /// Minimum delay between geocoding requests, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub geocode_delay_ms: u64,

    /// JSON file caching locations across runs
    #[arg(long, env = "GPX_COURSES_GEOCODE_CACHE", value_hint = ValueHint::FilePath)]
    pub geocode_cache: Option<PathBuf>,

    /// Do not contact the geocoding service; uncached locations become "Unknown"
    #[arg(long)]
    pub offline: bool,
}

impl From<BuildArgs> for BuildConfig {
    fn from(args: BuildArgs) -> Self {
        Self {
            gpx_dir: args.gpx_dir,
            output: args.output,
            overwrite: args.overwrite,
            asset_prefix: args.asset_prefix,
            exclude: args.exclude,
            anchor: args.anchor,
            geocoder: GeocoderConfig {
                url: args.geocoder_url,
                timeout: Duration::from_secs(args.geocode_timeout_secs),
                min_interval: Duration::from_millis(args.geocode_delay_ms),
                cache_path: args.geocode_cache,
                offline: args.offline,
                ..Default::default()
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Catalog JSON file
    #[arg(long, default_value = "gpx_courses.json", value_hint = ValueHint::FilePath)]
    pub catalog: PathBuf,

    /// Minimum distance in km
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Maximum distance in km
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Exact location name
    #[arg(long)]
    pub location: Option<String>,

    /// Base URL the catalog's file paths are relative to
    #[arg(long, default_value = "")]
    pub asset_base: String,
}

impl ListArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            location: self.location.clone(),
        }
    }
}
