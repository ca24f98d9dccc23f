use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::config::Anchor;

/// Label written to the catalog when a location cannot be resolved.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// One recorded sample along a route.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: Option<f64>,
    pub timestamp: Option<OffsetDateTime>,
    /// Position in recording order across the whole file.
    pub sequence: usize,
    /// Index of the track segment (counted across all tracks) this point belongs to.
    pub segment: usize,
}

/// Ordered track points read from a single GPX file.
#[derive(Debug, Clone)]
pub struct Track {
    pub source: PathBuf,
    pub points: Vec<TrackPoint>,
}

impl Track {
    pub fn new(source: impl Into<PathBuf>, points: Vec<TrackPoint>) -> Self {
        Self {
            source: source.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Timestamp of the first point that carries one.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        self.points.iter().find_map(|pt| pt.timestamp)
    }

    /// First recorded (lat, lon).
    pub fn start(&self) -> Option<(f64, f64)> {
        self.points.first().map(|pt| (pt.lat, pt.lon))
    }

    /// Mean position of all points. Longitude is averaged on the circle so
    /// a track crossing the antimeridian stays near +/-180.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (lat_sum, sin_sum, cos_sum) =
            self.points
                .iter()
                .fold((0.0, 0.0, 0.0), |(lat, sin, cos), pt| {
                    let (lon_sin, lon_cos) = pt.lon.to_radians().sin_cos();
                    (lat + pt.lat, sin + lon_sin, cos + lon_cos)
                });

        let mut lon = sin_sum.atan2(cos_sum).to_degrees();
        if lon >= 180.0 {
            lon -= 360.0;
        }
        Some((lat_sum / n, lon))
    }

    /// The coordinate used for reverse geocoding.
    pub fn anchor(&self, anchor: Anchor) -> Option<(f64, f64)> {
        match anchor {
            Anchor::Start => self.start(),
            Anchor::Centroid => self.centroid(),
        }
    }
}

/// Totals derived from a [`Track`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub distance_km: f64,
    pub elevation_gain_m: f64,
}

/// Outcome of a reverse-geocoding lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationResult {
    pub label: String,
    pub resolved: bool,
}

impl LocationResult {
    pub fn resolved(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            resolved: true,
        }
    }

    pub fn unknown() -> Self {
        Self {
            label: UNKNOWN_LOCATION.to_string(),
            resolved: false,
        }
    }
}

/// A catalog entry, serialized with exactly these keys in this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    /// Path of the GPX asset relative to the site's asset base.
    pub file: String,
    pub location: String,
    /// Metres, rounded to 0.1.
    #[serde(deserialize_with = "number_or_string")]
    pub elevation_gain: f64,
    /// Kilometres, rounded to 0.1.
    pub distance: f64,
}

pub type Catalog = Vec<Course>;

impl Course {
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        location: impl Into<String>,
        metrics: &Metrics,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            location: location.into(),
            elevation_gain: round_to(metrics.elevation_gain_m, 1),
            distance: round_to(metrics.distance_km, 1),
        }
    }

    /// Base name of the referenced GPX file.
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }

    /// Whether the referenced file is present in `dir`.
    pub fn exists_in(&self, dir: &Path) -> bool {
        dir.join(self.file_name()).is_file()
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Older catalogs wrote the elevation gain as text, sometimes with a unit.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(text) => text
            .trim()
            .trim_end_matches('m')
            .trim()
            .parse()
            .map_err(serde::de::Error::custom),
    }
}
