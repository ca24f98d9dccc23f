//! Configuration types for fixture generation.

use std::path::PathBuf;

/// A named reference location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    /// (lat, lon)
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Central Paris - flat city running.
    pub const PARIS: Place = Place::new("Paris", 48.85, 2.35);

    /// Annecy - lakeside rides with climbs into the Alps.
    pub const ANNECY: Place = Place::new("Annecy", 45.8992, 6.1294);

    /// Zürich - riverside and hill loops.
    pub const ZURICH: Place = Place::new("Zürich", 47.3769, 8.5417);

    /// Open ocean, where reverse geocoding finds nothing.
    pub const MID_PACIFIC: Place = Place::new("Pacific Ocean", 0.0, -160.0);
}

/// Configuration for writing a fixture directory.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    /// Directory the GPX files are written to.
    pub output_dir: PathBuf,

    /// Seed for GPS jitter, so regenerated sets are identical.
    pub seed: u64,

    /// GPS position jitter standard deviation in meters.
    pub gps_jitter_m: f64,

    /// Include deliberately broken files alongside the valid ones.
    pub include_malformed: bool,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("assets/gpx"),
            seed: 12345,
            gps_jitter_m: 2.0,
            include_malformed: false,
        }
    }
}
