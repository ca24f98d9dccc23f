//! GPX fixture generation for gpx-courses.
//!
//! This crate builds synthetic GPS tracks with known geometry (legs of a given
//! bearing and length), controllable elevation profiles, and serializes them
//! as GPX 1.1, so catalog tests can assert exact distances and gains.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let points = RouteBuilder::new(Place::PARIS.coords())
//!     .leg(0.0, 1000.0)
//!     .leg(90.0, 1000.0)
//!     .elevation(ElevationProfile::ramp(35.0, 80.0))
//!     .build_exact();
//! let bytes = generate_gpx(&[points], "Right Angle");
//! ```

pub mod config;
pub mod fixtures;
pub mod gpx;
pub mod sources;
pub mod terrain;

use time::OffsetDateTime;

/// One generated track point.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub timestamp: Option<OffsetDateTime>,
}

impl SamplePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            elevation: None,
            timestamp: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::SamplePoint;
    pub use crate::config::{FixtureConfig, Place};
    pub use crate::fixtures::{FixtureDir, demo_set};
    pub use crate::gpx::{generate_gpx, malformed};
    pub use crate::sources::{Leg, RouteBuilder};
    pub use crate::terrain::ElevationProfile;
}
