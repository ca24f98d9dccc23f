//! End-to-end catalog builds over generated GPX directories.
//!
//! The geocoder is replaced by an in-process fake that answers from a fixed
//! list of places, except for the unreachable-host test which points the real
//! Photon client at a closed local port.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use courses::browse::{AppState, FilterCriteria};
use courses::catalog::run_build;
use courses::config::{Anchor, BuildConfig, GeocoderConfig};
use courses::errors::{CatalogError, ResolutionError};
use courses::geocode::{Geocoder, PhotonGeocoder};
use courses::models::UNKNOWN_LOCATION;
use tempfile::TempDir;
use test_data::prelude::*;

/// Answers with the closest known place within ~0.5 degrees, counting calls.
#[derive(Clone, Default)]
struct PlacesGeocoder {
    calls: Arc<AtomicUsize>,
}

impl PlacesGeocoder {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for PlacesGeocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let place = [Place::PARIS, Place::ANNECY, Place::ZURICH]
            .into_iter()
            .find(|p| (p.lat - lat).abs() < 0.5 && (p.lon - lon).abs() < 0.5);
        Ok(place.map(|p| p.name.to_string()))
    }
}

fn config_for(root: &Path) -> BuildConfig {
    BuildConfig {
        gpx_dir: root.join("gpx"),
        output: root.join("site/gpx_courses.json"),
        asset_prefix: Some("/gpx".to_string()),
        geocoder: GeocoderConfig {
            min_interval: Duration::ZERO,
            timeout: Duration::from_secs(2),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn paris_right_angle() -> RouteBuilder {
    RouteBuilder::right_angle(Place::PARIS.coords(), 1000.0)
        .elevation(ElevationProfile::ramp(35.0, 80.0))
}

fn annecy_trapezoid() -> RouteBuilder {
    RouteBuilder::trapezoid(Place::ANNECY.coords(), 1000.0, 1500.0)
        .elevation(ElevationProfile::ramp(450.0, 700.0))
}

#[tokio::test]
async fn test_partial_failure_keeps_good_files() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();
    fixtures.write_route("annecy-climb.gpx", &annecy_trapezoid()).unwrap();
    fixtures.write("broken.gpx", &malformed::not_xml()).unwrap();

    let geocoder = PlacesGeocoder::default();
    let report = run_build(&config, geocoder.clone()).await.unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file, "broken.gpx");
    assert_eq!(geocoder.calls(), 2);

    let names: Vec<&str> = report.catalog.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Annecy Climb", "Paris Right Angle"]);

    let paris = &report.catalog[1];
    assert_eq!(paris.file, "/gpx/paris-right_angle.gpx");
    assert_eq!(paris.location, "Paris");
    assert!((paris.distance - 2.0).abs() <= 0.02);
    assert!((paris.elevation_gain - 45.0).abs() < 1e-9);

    let annecy = &report.catalog[0];
    assert_eq!(annecy.location, "Annecy");
    assert!((annecy.distance - 3.5).abs() <= 0.035);
    assert!((annecy.elevation_gain - 250.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_written_catalog_reloads_unchanged() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();
    fixtures.write_route("annecy-climb.gpx", &annecy_trapezoid()).unwrap();

    let report = run_build(&config, PlacesGeocoder::default()).await.unwrap();

    let json = std::fs::read_to_string(&config.output).unwrap();
    assert!(json.ends_with("]\n"));
    let state = AppState::from_json(&json).unwrap();

    assert_eq!(state.all_courses.len(), report.catalog.len());
    for (loaded, built) in state.all_courses.iter().zip(&report.catalog) {
        assert_eq!(loaded.name, built.name);
        assert_eq!(loaded.file, built.file);
        assert_eq!(loaded.location, built.location);
        assert!((loaded.distance - built.distance).abs() < 1e-6);
        assert!((loaded.elevation_gain - built.elevation_gain).abs() < 1e-6);
    }

    let mut state = state;
    let visible = state.apply(FilterCriteria {
        location: Some("Paris".to_string()),
        ..Default::default()
    });
    assert_eq!(visible.len(), 1);
    assert_eq!(state.reset().len(), 2);
}

#[tokio::test]
async fn test_unreachable_geocoder_degrades_to_unknown() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path());
    config.geocoder.url = "http://127.0.0.1:9/reverse".to_string();
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();

    let geocoder = PhotonGeocoder::from_config(&config.geocoder).unwrap();
    let report = run_build(&config, geocoder).await.unwrap();

    assert_eq!(report.total(), 1);
    assert_eq!(report.catalog[0].location, UNKNOWN_LOCATION);
    assert_eq!(report.resolver.failures, 1);
    // One attempt plus one retry.
    assert_eq!(report.resolver.lookups, 2);
    assert!(config.output.is_file());
}

#[tokio::test]
async fn test_no_place_found_is_unknown() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    let ocean = RouteBuilder::new(Place::MID_PACIFIC.coords()).leg(270.0, 5000.0);
    fixtures.write_route("ocean-crossing.gpx", &ocean).unwrap();

    let report = run_build(&config, PlacesGeocoder::default()).await.unwrap();
    let course = &report.catalog[0];
    assert_eq!(course.location, UNKNOWN_LOCATION);
    assert_eq!(course.elevation_gain, 0.0);
    assert_eq!(report.resolver.failures, 0);
}

#[tokio::test]
async fn test_incremental_build_skips_and_drops() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    let paris = fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();
    fixtures.write_route("annecy-climb.gpx", &annecy_trapezoid()).unwrap();

    run_build(&config, PlacesGeocoder::default()).await.unwrap();

    std::fs::remove_file(paris).unwrap();
    let zurich = RouteBuilder::right_angle(Place::ZURICH.coords(), 800.0);
    fixtures.write_route("zurich-loop.gpx", &zurich).unwrap();

    let geocoder = PlacesGeocoder::default();
    let report = run_build(&config, geocoder.clone()).await.unwrap();

    assert_eq!(report.kept, 1);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.already_catalogued, 1);
    assert_eq!(report.added, 1);
    assert_eq!(geocoder.calls(), 1);

    let names: Vec<&str> = report.catalog.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Annecy Climb", "Zurich Loop"]);
    assert_eq!(report.catalog[1].location, "Zürich");
}

#[tokio::test]
async fn test_overwrite_reprocesses_everything() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path());
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();

    run_build(&config, PlacesGeocoder::default()).await.unwrap();

    config.overwrite = true;
    let geocoder = PlacesGeocoder::default();
    let report = run_build(&config, geocoder.clone()).await.unwrap();

    assert_eq!(report.kept, 0);
    assert_eq!(report.added, 1);
    assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn test_persistent_cache_reused_across_runs() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path());
    config.overwrite = true;
    config.geocoder.cache_path = Some(dir.path().join("cache/geocode.json"));
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();
    fixtures.write_route("annecy-climb.gpx", &annecy_trapezoid()).unwrap();

    let first = PlacesGeocoder::default();
    run_build(&config, first.clone()).await.unwrap();
    assert_eq!(first.calls(), 2);
    assert!(config.geocoder.cache_path.as_ref().unwrap().is_file());

    let second = PlacesGeocoder::default();
    let report = run_build(&config, second.clone()).await.unwrap();
    assert_eq!(second.calls(), 0);
    assert_eq!(report.resolver.cache_hits, 2);
    assert_eq!(report.catalog[1].location, "Paris");
}

#[tokio::test]
async fn test_excluded_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path());
    config.exclude = vec!["treadmill".to_string()];
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();
    fixtures.write_route("indoor_treadmill.gpx", &paris_right_angle()).unwrap();

    let report = run_build(&config, PlacesGeocoder::default()).await.unwrap();
    assert_eq!(report.total(), 1);
    assert_eq!(report.excluded, 1);
}

#[tokio::test]
async fn test_exclude_removes_existing_entries() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path());
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    fixtures.write_route("paris-right_angle.gpx", &paris_right_angle()).unwrap();
    fixtures.write_route("indoor_treadmill.gpx", &paris_right_angle()).unwrap();

    let first = run_build(&config, PlacesGeocoder::default()).await.unwrap();
    assert_eq!(first.total(), 2);

    config.exclude = vec!["treadmill".to_string()];
    let report = run_build(&config, PlacesGeocoder::default()).await.unwrap();

    assert_eq!(report.total(), 1);
    assert_eq!(report.kept, 1);
    assert_eq!(report.excluded, 1);
    assert_eq!(report.catalog[0].file, "/gpx/paris-right_angle.gpx");

    let json = std::fs::read_to_string(&config.output).unwrap();
    assert!(!json.contains("treadmill"));
}

#[tokio::test]
async fn test_centroid_anchor_locates_by_mean_position() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path());
    config.overwrite = true;
    let fixtures = FixtureDir::new(&config.gpx_dir).unwrap();
    // Starts ~0.85 degrees west of Paris and ends as far east of it.
    let ride = RouteBuilder::new((Place::PARIS.lat, 1.5)).leg(90.0, 124_000.0);
    fixtures.write_route("seine-valley.gpx", &ride).unwrap();

    let by_start = run_build(&config, PlacesGeocoder::default()).await.unwrap();
    assert_eq!(by_start.catalog[0].location, UNKNOWN_LOCATION);

    config.anchor = Anchor::Centroid;
    let by_centroid = run_build(&config, PlacesGeocoder::default()).await.unwrap();
    assert_eq!(by_centroid.catalog[0].location, "Paris");
    assert_eq!(by_centroid.catalog[0].distance, by_start.catalog[0].distance);
}

#[tokio::test]
async fn test_missing_input_dir_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());

    let err = run_build(&config, PlacesGeocoder::default()).await.unwrap_err();
    assert!(matches!(err, CatalogError::InputDirMissing(_)));
    assert!(!config.output.exists());
}

#[tokio::test]
async fn test_empty_input_dir_writes_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());
    FixtureDir::new(&config.gpx_dir).unwrap();

    let report = run_build(&config, PlacesGeocoder::default()).await.unwrap();
    assert_eq!(report.total(), 0);
    assert_eq!(std::fs::read_to_string(&config.output).unwrap(), "[]\n");
}
