//! Writing GPX fixtures to disk.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;

use crate::config::{FixtureConfig, Place};
use crate::gpx::{generate_gpx, malformed};
use crate::sources::RouteBuilder;
use crate::terrain::ElevationProfile;

/// A directory of GPX files.
#[derive(Debug, Clone)]
pub struct FixtureDir {
    root: PathBuf,
}

impl FixtureDir {
    /// Uses `root`, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.root.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a route's exact points as a single-segment track.
    pub fn write_route(&self, file_name: &str, route: &RouteBuilder) -> std::io::Result<PathBuf> {
        let name = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.write(file_name, &generate_gpx(&[route.build_exact()], &name))
    }
}

/// The demo asset set: a few real-looking courses, plus broken files when
/// `include_malformed` is set.
pub fn demo_set(config: &FixtureConfig) -> Vec<(String, Vec<u8>)> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let start_time = OffsetDateTime::UNIX_EPOCH + time::Duration::days(19_800);
    let jitter = config.gps_jitter_m;

    let routes = [
        (
            "paris-canal_run.gpx",
            RouteBuilder::out_and_back(Place::PARIS.coords(), 60.0, 4000.0)
                .elevation(ElevationProfile::Flat(35.0))
                .timed(start_time, 3.2),
        ),
        (
            "annecy-col-de-la-forclaz.gpx",
            RouteBuilder::trapezoid(Place::ANNECY.coords(), 6000.0, 9000.0)
                .elevation(ElevationProfile::ramp(450.0, 1150.0))
                .timed(start_time, 6.5),
        ),
        (
            "zurich_uetliberg_loop.gpx",
            RouteBuilder::right_angle(Place::ZURICH.coords(), 2500.0)
                .elevation(ElevationProfile::ramp(410.0, 870.0))
                .timed(start_time, 2.8),
        ),
        (
            "pacific-crossing.gpx",
            RouteBuilder::new(Place::MID_PACIFIC.coords()).leg(270.0, 20_000.0),
        ),
    ];

    let mut files: Vec<(String, Vec<u8>)> = routes
        .into_iter()
        .map(|(file_name, route)| {
            let points = route.with_jitter(jitter, jitter).build(&mut rng);
            let stem = file_name.trim_end_matches(".gpx");
            (file_name.to_string(), generate_gpx(&[points], stem))
        })
        .collect();

    if config.include_malformed {
        files.push(("broken-export.gpx".to_string(), malformed::not_xml()));
        files.push(("empty-track.gpx".to_string(), malformed::no_track_points()));
    }

    files
}

/// Writes [`demo_set`] into `config.output_dir`.
pub fn write_demo_set(config: &FixtureConfig) -> std::io::Result<Vec<PathBuf>> {
    let dir = FixtureDir::new(&config.output_dir)?;
    demo_set(config)
        .iter()
        .map(|(file_name, bytes)| dir.write(file_name, bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_set_is_reproducible() {
        let config = FixtureConfig::default();
        assert_eq!(demo_set(&config), demo_set(&config));
        assert_eq!(demo_set(&config).len(), 4);
    }

    #[test]
    fn test_write_demo_set_with_malformed() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = FixtureConfig {
            output_dir: dir.path().join("gpx"),
            include_malformed: true,
            ..Default::default()
        };

        let written = write_demo_set(&config).unwrap();
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_write_route() {
        let dir = tempfile::TempDir::new().unwrap();
        let fixtures = FixtureDir::new(dir.path()).unwrap();
        let path = fixtures
            .write_route("square.gpx", &RouteBuilder::right_angle((10.0, 10.0), 300.0))
            .unwrap();

        let parsed = ::gpx::read(std::fs::File::open(path).unwrap()).unwrap();
        assert_eq!(parsed.tracks[0].name.as_deref(), Some("square"));
    }
}
