//! GPX course catalog generation.
//!
//! Turns a directory of GPX recordings into a JSON list of courses (name,
//! location, distance, elevation gain, file) for a static route listing.
//!
//! ```rust,ignore
//! use courses::prelude::*;
//!
//! let config = BuildConfig {
//!     gpx_dir: "assets/gpx".into(),
//!     output: "data/gpx_courses.json".into(),
//!     ..Default::default()
//! };
//! let geocoder = PhotonGeocoder::from_config(&config.geocoder)?;
//! let report = run_build(&config, geocoder).await?;
//! ```

pub mod browse;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod file_parsers;
pub mod geocode;
pub mod models;
pub mod scoring;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::browse::{AppState, CourseCard, FilterCriteria, filter_courses, load_catalog};
    pub use crate::catalog::{BuildReport, CatalogBuilder, run_build, write_catalog};
    pub use crate::config::{Anchor, BuildConfig, GeocoderConfig};
    pub use crate::errors::{CatalogError, ParseError, ResolutionError, SchemaError};
    pub use crate::file_parsers::{parse_gpx, parse_gpx_file};
    pub use crate::geocode::{GeocodeCache, Geocoder, LocationResolver, PhotonGeocoder};
    pub use crate::models::{Course, LocationResult, Metrics, Track, TrackPoint};
    pub use crate::scoring::score_track;
}
