//! Elevation profiles for generated tracks.

mod elevation;

pub use elevation::{ElevationProfile, add_elevation_jitter};
