//! Reverse-geocoding cache keyed by rounded coordinates.

use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::write_atomic;
use crate::errors::CatalogError;
use crate::models::round_to;

/// Maps rounded `"lat,lon"` keys to a place label, or `None` when the service
/// answered that there is no place at that coordinate. Failed lookups are
/// never stored.
#[derive(Debug, Clone)]
pub struct GeocodeCache {
    precision: u32,
    entries: BTreeMap<String, Option<String>>,
    dirty: bool,
}

impl GeocodeCache {
    pub fn new(precision: u32) -> Self {
        Self {
            precision,
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Loads a cache written by [`GeocodeCache::save`].
    ///
    /// A missing file yields an empty cache; an unreadable one is logged and
    /// ignored so that a bad cache never blocks a build.
    pub fn load(path: &Path, precision: u32) -> Self {
        let mut cache = Self::new(precision);
        if !path.exists() {
            return cache;
        }

        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|data| serde_json::from_str(&data).map_err(|e| e.to_string()))
        {
            Ok(entries) => {
                cache.entries = entries;
                tracing::debug!(
                    "Loaded {} cached locations from {}",
                    cache.entries.len(),
                    path.display()
                );
            }
            Err(e) => {
                tracing::warn!("Ignoring geocode cache {}: {e}", path.display());
            }
        }
        cache
    }

    /// Writes the cache as pretty JSON, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let mut data = serde_json::to_vec_pretty(&self.entries)?;
        data.push(b'\n');
        write_atomic(path, &data)?;
        tracing::debug!("Saved {} cached locations to {}", self.len(), path.display());
        Ok(())
    }

    pub fn key(&self, lat: f64, lon: f64) -> String {
        let decimals = self.precision as usize;
        // `+ 0.0` turns -0.0 into 0.0 so both sides of the equator share a key.
        let lat = round_to(lat, self.precision as i32) + 0.0;
        let lon = round_to(lon, self.precision as i32) + 0.0;
        format!("{lat:.decimals$},{lon:.decimals$}")
    }

    pub fn get(&self, lat: f64, lon: f64) -> Option<&Option<String>> {
        self.entries.get(&self.key(lat, lon))
    }

    pub fn insert(&mut self, lat: f64, lon: f64, label: Option<String>) {
        let key = self.key(lat, lon);
        self.entries.insert(key, label);
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether entries were added since the cache was created or loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rounding() {
        let cache = GeocodeCache::new(4);
        assert_eq!(cache.key(48.85, 2.35), "48.8500,2.3500");
        assert_eq!(cache.key(48.850_04, 2.349_96), "48.8500,2.3500");
        assert_ne!(cache.key(48.8501, 2.35), cache.key(48.8502, 2.35));
    }

    #[test]
    fn test_negative_zero_shares_key() {
        let cache = GeocodeCache::new(3);
        assert_eq!(cache.key(-0.00001, 0.00001), "0.000,0.000");
        assert_eq!(cache.key(-0.00001, 0.00001), cache.key(0.0, 0.0));
    }

    #[test]
    fn test_near_duplicates_coalesce() {
        let mut cache = GeocodeCache::new(4);
        cache.insert(48.85, 2.35, Some("Paris".to_string()));
        assert_eq!(cache.get(48.850_01, 2.350_02), Some(&Some("Paris".to_string())));
        assert!(cache.get(48.86, 2.35).is_none());
        assert!(cache.is_dirty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("geocode.json");

        let mut cache = GeocodeCache::new(4);
        cache.insert(48.85, 2.35, Some("Paris".to_string()));
        cache.insert(0.0, -160.0, None);
        cache.save(&path).unwrap();

        let loaded = GeocodeCache::load(&path, 4);
        assert_eq!(loaded.len(), 2);
        assert!(!loaded.is_dirty());
        assert_eq!(loaded.get(48.85, 2.35), Some(&Some("Paris".to_string())));
        assert_eq!(loaded.get(0.0, -160.0), Some(&None));
    }

    #[test]
    fn test_load_missing_or_corrupt() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = GeocodeCache::load(&dir.path().join("nope.json"), 4);
        assert!(missing.is_empty());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(GeocodeCache::load(&corrupt, 4).is_empty());
    }
}
