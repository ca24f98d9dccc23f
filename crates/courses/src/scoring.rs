//! Distance and elevation-gain accumulation over a track.
//!
//! Both totals are built from consecutive point pairs within the same
//! segment. A pair where either point has no elevation is skipped for the
//! gain total rather than counted as a zero change, so a gap in the
//! altimeter record is never read as a descent followed by a climb.

use geo::{Distance as _, Haversine, geometry::Point};

use crate::models::{Metrics, Track, TrackPoint};

pub trait TrackMetric {
    type Score;
    fn next_point(&mut self, point: &TrackPoint);
    fn finish(&mut self) -> Self::Score;
}

/// Computes distance (km) and positive elevation gain (m) for a track.
pub fn score_track(track: &Track) -> Metrics {
    score_points(&track.points)
}

pub fn score_points(points: &[TrackPoint]) -> Metrics {
    let mut acc = TrackTotals::default();
    for point in points {
        acc.next_point(point);
    }
    acc.finish()
}

#[derive(Debug, Clone, Default)]
struct TrackTotals {
    distance: DistanceMetric,
    elevation_gain: ElevationGainMetric,
}

impl TrackMetric for TrackTotals {
    type Score = Metrics;

    fn next_point(&mut self, point: &TrackPoint) {
        self.distance.next_point(point);
        self.elevation_gain.next_point(point);
    }

    fn finish(&mut self) -> Metrics {
        Metrics {
            distance_km: self.distance.finish() / 1000.0,
            elevation_gain_m: self.elevation_gain.finish(),
        }
    }
}

/// Great-circle distance in metres.
#[derive(Debug, Clone, Default)]
struct DistanceMetric {
    total_distance: f64,
    last: Option<(usize, Point)>,
}

impl TrackMetric for DistanceMetric {
    type Score = f64;

    fn next_point(&mut self, pt: &TrackPoint) {
        let here = Point::new(pt.lon, pt.lat);
        if let Some((segment, prev)) = self.last
            && segment == pt.segment
        {
            let step = Haversine.distance(prev, here);
            if step.is_finite() {
                self.total_distance += step;
            }
        }
        self.last = Some((pt.segment, here));
    }

    fn finish(&mut self) -> f64 {
        self.total_distance
    }
}

#[derive(Debug, Clone, Default)]
struct ElevationGainMetric {
    total_gain: f64,
    last: Option<(usize, Option<f64>)>,
}

impl TrackMetric for ElevationGainMetric {
    type Score = f64;

    fn next_point(&mut self, pt: &TrackPoint) {
        if let Some((segment, Some(prev))) = self.last
            && segment == pt.segment
            && let Some(elevation) = pt.elevation
        {
            let gain = elevation - prev;
            if gain > 0.0 {
                self.total_gain += gain;
            }
        }
        self.last = Some((pt.segment, pt.elevation));
    }

    fn finish(&mut self) -> f64 {
        self.total_gain
    }
}
