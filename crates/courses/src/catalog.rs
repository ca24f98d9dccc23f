//! Catalog assembly: GPX directory in, course JSON out.
//!
//! Each file goes through parse, metrics and location lookup on its own.
//! A file that fails to parse is logged and skipped; a failed lookup only
//! degrades that course's location. Only directory and output failures
//! abort the run.

use std::collections::HashSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::errors::{CatalogError, ParseError};
use crate::file_parsers::parse_gpx_file;
use crate::geocode::{GeocodeCache, Geocoder, LocationResolver, ResolverStats};
use crate::models::{Catalog, Course, LocationResult};
use crate::scoring::score_track;

/// A file left out of the catalog and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Outcome of one build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub catalog: Catalog,
    /// Courses created in this run.
    pub added: usize,
    /// Courses carried over from the existing catalog.
    pub kept: usize,
    /// Existing courses dropped because their GPX file is gone.
    pub dropped: usize,
    /// Files not reprocessed because the existing catalog lists them.
    pub already_catalogued: usize,
    /// Files matching an exclude pattern.
    pub excluded: usize,
    pub skipped: Vec<SkippedFile>,
    pub resolver: ResolverStats,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.catalog.len()
    }

    pub fn log_summary(&self) {
        info!("Done. Total entries: {}", self.total());
        info!("  Added: {}", self.added);
        info!("  Kept: {}", self.kept);
        info!("  Already catalogued: {}", self.already_catalogued);
        if self.excluded > 0 {
            info!("  Excluded: {}", self.excluded);
        }
        if self.dropped > 0 {
            info!("  Dropped (file missing): {}", self.dropped);
        }
        info!(
            "  Location lookups: {} ({} cache hits, {} failed)",
            self.resolver.lookups, self.resolver.cache_hits, self.resolver.failures
        );
        if !self.skipped.is_empty() {
            warn!("  Skipped: {}", self.skipped.len());
            for skipped in &self.skipped {
                warn!("    {}: {}", skipped.file, skipped.reason);
            }
        }
    }
}

pub struct CatalogBuilder<G> {
    config: BuildConfig,
    resolver: LocationResolver<G>,
}

impl<G: Geocoder> CatalogBuilder<G> {
    pub fn new(config: BuildConfig, resolver: LocationResolver<G>) -> Self {
        Self { config, resolver }
    }

    /// Processes every GPX file in the input directory and returns the
    /// merged, sorted catalog. Nothing is written.
    pub async fn build(&mut self) -> Result<BuildReport, CatalogError> {
        let gpx_dir = self.config.gpx_dir.clone();
        if !gpx_dir.is_dir() {
            return Err(CatalogError::InputDirMissing(gpx_dir));
        }

        let mut report = BuildReport::default();
        let mut catalogued = HashSet::new();
        let mut courses = Vec::new();

        if !self.config.overwrite {
            for course in load_existing(&self.config.output) {
                let file_name = course.file_name().to_string();
                if self.config.is_excluded(&file_name) {
                    // Counted as excluded when discovery reaches the file.
                    info!("Removing excluded entry: {}", course.name);
                } else if !course.exists_in(&gpx_dir) {
                    warn!("Dropping {}: {} no longer exists", course.name, course.file);
                    report.dropped += 1;
                } else if catalogued.insert(file_name) {
                    courses.push(course);
                    report.kept += 1;
                }
            }
        }

        for path in discover_gpx_files(&gpx_dir)? {
            let file_name = file_name_of(&path);

            if self.config.is_excluded(&file_name) {
                debug!("Excluded: {file_name}");
                report.excluded += 1;
                continue;
            }
            if catalogued.contains(&file_name) {
                info!("Skipping existing: {file_name}");
                report.already_catalogued += 1;
                continue;
            }

            info!("Processing: {file_name}");
            match self.process_file(&path).await {
                Ok(course) => {
                    info!(
                        "Added: {} ({} km, {})",
                        course.name, course.distance, course.location
                    );
                    courses.push(course);
                    report.added += 1;
                }
                Err(e) => {
                    warn!("Error processing {file_name}: {e}");
                    report.skipped.push(SkippedFile {
                        file: file_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        sort_catalog(&mut courses);
        report.catalog = courses;
        report.resolver = self.resolver.stats();
        Ok(report)
    }

    /// Parse, measure and locate a single file.
    pub async fn process_file(&mut self, path: &Path) -> Result<Course, ParseError> {
        let track = parse_gpx_file(path)?;
        let metrics = score_track(&track);
        let location = match track.anchor(self.config.anchor) {
            Some((lat, lon)) => self.resolver.resolve(lat, lon).await,
            None => LocationResult::unknown(),
        };

        let file_name = file_name_of(path);
        Ok(Course::new(
            course_name(&file_name),
            self.config.asset_path(&file_name),
            location.label,
            &metrics,
        ))
    }

    pub fn into_resolver(self) -> LocationResolver<G> {
        self.resolver
    }
}

/// Builds the catalog described by `config` and writes it.
///
/// Loads and saves the persistent geocode cache when one is configured.
pub async fn run_build<G: Geocoder>(
    config: &BuildConfig,
    geocoder: G,
) -> Result<BuildReport, CatalogError> {
    let geocoder_config = &config.geocoder;
    let mut resolver = LocationResolver::new(geocoder, geocoder_config);
    if let Some(cache_path) = &geocoder_config.cache_path {
        resolver =
            resolver.with_cache(GeocodeCache::load(cache_path, geocoder_config.cache_precision));
    }

    let mut builder = CatalogBuilder::new(config.clone(), resolver);
    let report = builder.build().await?;

    write_catalog(&config.output, &report.catalog)?;
    info!("Wrote {} courses to {}", report.total(), config.output.display());

    let resolver = builder.into_resolver();
    if let Some(cache_path) = &geocoder_config.cache_path
        && resolver.cache().is_dirty()
        && let Err(e) = resolver.cache().save(cache_path)
    {
        warn!("Could not save geocode cache: {e}");
    }

    report.log_summary();
    Ok(report)
}

/// Regular `.gpx` files (any case) directly inside `dir`, sorted by name.
pub fn discover_gpx_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::InputDirMissing(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CatalogError::io(dir, e))? {
        let path = entry.map_err(|e| CatalogError::io(dir, e))?.path();
        let is_gpx = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"));
        if is_gpx && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Human-readable course name from a file name:
/// `mont-blanc_loop.gpx` becomes `Mont Blanc Loop`.
pub fn course_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name = String::with_capacity(stem.len());
    let mut prev_alpha = false;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_alpha {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            name.push(c);
            prev_alpha = false;
        }
    }
    name
}

/// Reads a previously written catalog. A missing file is an empty catalog;
/// an unreadable one is logged and also treated as empty.
pub fn load_existing(path: &Path) -> Catalog {
    if !path.exists() {
        return Vec::new();
    }

    let loaded = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|data| serde_json::from_str::<Catalog>(&data).map_err(|e| e.to_string()));

    match loaded {
        Ok(catalog) => {
            info!("Loaded {} existing entries.", catalog.len());
            catalog
        }
        Err(e) => {
            warn!(
                "Could not read existing catalog {}: {e}; starting fresh",
                path.display()
            );
            Vec::new()
        }
    }
}

/// Serializes the catalog as pretty JSON and replaces `path` atomically.
pub fn write_catalog(path: &Path, catalog: &[Course]) -> Result<(), CatalogError> {
    let mut data = serde_json::to_vec_pretty(catalog)?;
    data.push(b'\n');
    write_atomic(path, &data)
}

/// Writes to a temporary file beside `path`, then renames it into place, so
/// readers see either the old file or the complete new one.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CatalogError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| CatalogError::io(parent, e))?;
    tmp.write_all(data)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CatalogError::io(tmp.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| CatalogError::io(tmp.path(), e))?;
    }

    tmp.persist(path)
        .map_err(|e| CatalogError::io(path, e.error))?;
    Ok(())
}

fn sort_catalog(catalog: &mut Catalog) {
    catalog.sort_by(|a, b| {
        a.file_name()
            .cmp(b.file_name())
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metrics;
    use tempfile::TempDir;

    #[test]
    fn test_course_name() {
        assert_eq!(course_name("mont-blanc_loop.gpx"), "Mont Blanc Loop");
        assert_eq!(course_name("PARIS_10k.gpx"), "Paris 10K");
        assert_eq!(course_name("côte-d'azur.gpx"), "Côte D'Azur");
        assert_eq!(course_name("single.GPX"), "Single");
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.gpx", "a.GPX", "notes.txt", "c.gpx.bak"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("dir.gpx")).unwrap();

        let files = discover_gpx_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name_of(p)).collect();
        assert_eq!(names, vec!["a.GPX", "b.gpx"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover_gpx_files(Path::new("/no/such/gpx/dir")).unwrap_err();
        assert!(matches!(err, CatalogError::InputDirMissing(_)));
    }

    #[test]
    fn test_write_catalog_creates_parent_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("site/data/courses.json");
        let catalog = vec![Course::new(
            "Loop",
            "assets/gpx/loop.gpx",
            "Zürich",
            &Metrics {
                distance_km: 5.04,
                elevation_gain_m: 120.0,
            },
        )];

        write_catalog(&output, &catalog).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("\n  {\n    \"name\": \"Loop\""));
        assert!(text.contains("Zürich"));
        assert!(text.ends_with("]\n"));

        let entries = std::fs::read_dir(output.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_write_catalog_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("courses.json");
        std::fs::write(&output, "old contents").unwrap();

        write_catalog(&output, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]\n");
    }

    #[test]
    fn test_write_catalog_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = write_catalog(&blocker.join("courses.json"), &[]).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_load_existing_tolerates_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courses.json");
        assert!(load_existing(&path).is_empty());

        std::fs::write(&path, "[{\"name\": ").unwrap();
        assert!(load_existing(&path).is_empty());

        let catalog = vec![Course::new("A", "gpx/a.gpx", "X", &Metrics::default())];
        write_catalog(&path, &catalog).unwrap();
        assert_eq!(load_existing(&path), catalog);
    }
}
