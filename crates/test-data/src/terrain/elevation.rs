//! Deterministic elevation profiles.

use rand::Rng;

/// Elevation assigned to the points of a generated route.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ElevationProfile {
    /// No `<ele>` elements at all.
    #[default]
    None,
    /// Every point at the same height.
    Flat(f64),
    /// Linear change from the first point to the last.
    Ramp { from: f64, to: f64 },
    /// Explicit per-point values; points past the end have no elevation.
    Values(Vec<Option<f64>>),
}

impl ElevationProfile {
    pub fn ramp(from: f64, to: f64) -> Self {
        Self::Ramp { from, to }
    }

    /// Elevation of point `index` out of `count`.
    pub fn elevation_at(&self, index: usize, count: usize) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Flat(elevation) => Some(*elevation),
            Self::Ramp { from, to } => {
                if count < 2 {
                    return Some(*from);
                }
                let t = index as f64 / (count - 1) as f64;
                Some(from + (to - from) * t)
            }
            Self::Values(values) => values.get(index).copied().flatten(),
        }
    }

    /// Total positive change the profile describes over `count` points.
    pub fn expected_gain(&self, count: usize) -> f64 {
        let elevations: Vec<Option<f64>> =
            (0..count).map(|i| self.elevation_at(i, count)).collect();
        elevations
            .windows(2)
            .filter_map(|pair| match (pair[0], pair[1]) {
                (Some(a), Some(b)) if b > a => Some(b - a),
                _ => None,
            })
            .sum()
    }
}

/// Utility to add random altimeter noise to an elevation reading.
///
/// Real GPS devices have elevation accuracy of ±3-20m depending on conditions.
pub fn add_elevation_jitter(elevation: f64, rng: &mut impl Rng, std_dev: f64) -> f64 {
    use rand_distr::{Distribution, Normal};
    // Normal::new accepts a negative deviation and mirrors it.
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return elevation;
    }
    match Normal::new(0.0, std_dev) {
        Ok(normal) => elevation + normal.sample(rng),
        Err(_) => elevation,
    }
}
