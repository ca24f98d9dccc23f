//! Routes built from straight legs on a sphere.

use geo::{Destination as _, Haversine, Point};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use time::{Duration, OffsetDateTime};

use crate::SamplePoint;
use crate::terrain::{ElevationProfile, add_elevation_jitter};

/// A straight stretch of route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    /// Degrees clockwise from north.
    pub bearing: f64,
    /// Length in meters.
    pub meters: f64,
}

/// Builds a track by walking legs from a start point.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    start: (f64, f64),
    legs: Vec<Leg>,
    point_spacing_m: f64,
    elevation: ElevationProfile,
    gps_jitter_m: f64,
    elevation_jitter_m: f64,
    start_time: Option<OffsetDateTime>,
    /// Meters per second used to derive timestamps.
    speed_mps: f64,
}

impl RouteBuilder {
    /// Starts a route at (lat, lon).
    pub fn new(start: (f64, f64)) -> Self {
        Self {
            start,
            legs: Vec::new(),
            point_spacing_m: 100.0,
            elevation: ElevationProfile::None,
            gps_jitter_m: 0.0,
            elevation_jitter_m: 0.0,
            start_time: None,
            speed_mps: 3.0,
        }
    }

    /// Two legs of `meters` each, north then east.
    pub fn right_angle(start: (f64, f64), meters: f64) -> Self {
        Self::new(start).leg(0.0, meters).leg(90.0, meters)
    }

    /// An open trapezoid: up a slanted side, along the top, down the other side.
    pub fn trapezoid(start: (f64, f64), side_m: f64, top_m: f64) -> Self {
        Self::new(start)
            .leg(30.0, side_m)
            .leg(90.0, top_m)
            .leg(150.0, side_m)
    }

    /// Out along `bearing` and straight back.
    pub fn out_and_back(start: (f64, f64), bearing: f64, meters: f64) -> Self {
        Self::new(start)
            .leg(bearing, meters)
            .leg((bearing + 180.0) % 360.0, meters)
    }

    pub fn leg(mut self, bearing: f64, meters: f64) -> Self {
        self.legs.push(Leg { bearing, meters });
        self
    }

    /// Sets the approximate distance between generated points.
    pub fn with_point_spacing(mut self, meters: f64) -> Self {
        self.point_spacing_m = meters;
        self
    }

    pub fn elevation(mut self, profile: ElevationProfile) -> Self {
        self.elevation = profile;
        self
    }

    /// Sets GPS position and altimeter jitter (standard deviation, meters).
    pub fn with_jitter(mut self, position_m: f64, elevation_m: f64) -> Self {
        self.gps_jitter_m = position_m;
        self.elevation_jitter_m = elevation_m;
        self
    }

    /// Adds timestamps starting at `start`, moving at `speed_mps`.
    pub fn timed(mut self, start: OffsetDateTime, speed_mps: f64) -> Self {
        self.start_time = Some(start);
        self.speed_mps = speed_mps;
        self
    }

    /// Sum of leg lengths in meters.
    pub fn planned_distance(&self) -> f64 {
        self.legs.iter().map(|leg| leg.meters).sum()
    }

    /// Generates points exactly on the legs, without jitter.
    pub fn build_exact(&self) -> Vec<SamplePoint> {
        let path = self.path();
        let count = path.len();
        path.into_iter()
            .enumerate()
            .map(|(i, ((lat, lon), travelled))| SamplePoint {
                lat,
                lon,
                elevation: self.elevation.elevation_at(i, count),
                timestamp: self.timestamp_after(travelled),
            })
            .collect()
    }

    /// Generates points with the configured jitter applied.
    pub fn build(&self, rng: &mut impl Rng) -> Vec<SamplePoint> {
        let jitter_deg = (self.gps_jitter_m / 111_000.0).max(0.0);
        let position = Normal::new(0.0, jitter_deg).ok();

        self.build_exact()
            .into_iter()
            .map(|mut point| {
                if let Some(normal) = position {
                    point.lat = (point.lat + normal.sample(rng)).clamp(-90.0, 90.0);
                    point.lon = (point.lon + normal.sample(rng)).clamp(-180.0, 180.0);
                }
                if self.elevation_jitter_m > 0.0 {
                    point.elevation = point
                        .elevation
                        .map(|e| add_elevation_jitter(e, rng, self.elevation_jitter_m));
                }
                point
            })
            .collect()
    }

    /// Coordinates along the legs, each paired with the distance travelled to reach it.
    fn path(&self) -> Vec<((f64, f64), f64)> {
        let mut current = Point::new(self.start.1, self.start.0);
        let mut travelled = 0.0;
        let mut path = vec![(self.start, 0.0)];
        let spacing = self.point_spacing_m.max(1.0);

        for leg in &self.legs {
            let steps = (leg.meters / spacing).ceil().max(1.0) as usize;
            let step = leg.meters / steps as f64;
            for _ in 0..steps {
                current = Haversine.destination(current, leg.bearing, step);
                travelled += step;
                path.push(((current.y(), current.x()), travelled));
            }
        }

        path
    }

    fn timestamp_after(&self, travelled: f64) -> Option<OffsetDateTime> {
        let start = self.start_time?;
        if self.speed_mps <= 0.0 {
            return Some(start);
        }
        Some(start + Duration::seconds_f64(travelled / self.speed_mps))
    }
}
