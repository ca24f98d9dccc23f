//! Coordinate-to-place resolution.
//!
//! - [`Geocoder`]: one reverse-geocoding backend call
//! - [`PhotonGeocoder`]: the Photon HTTP backend
//! - [`LocationResolver`]: caching, throttling, timeout and retry around a backend
//!
//! The resolver is owned by a single task and takes `&mut self`, so cache
//! updates and the inter-call delay are never raced.

mod cache;
mod photon;

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

pub use cache::GeocodeCache;
pub use photon::PhotonGeocoder;

use crate::config::GeocoderConfig;
use crate::errors::ResolutionError;
use crate::models::LocationResult;

/// A reverse-geocoding backend.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up a place label for a coordinate. `Ok(None)` means the service
    /// answered but knows no place there.
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, ResolutionError>;
}

/// Lookup counters for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Network calls issued, retries included.
    pub lookups: usize,
    pub cache_hits: usize,
    /// Coordinates that degraded to an unknown location after all attempts.
    pub failures: usize,
}

pub struct LocationResolver<G> {
    geocoder: G,
    cache: GeocodeCache,
    timeout: Duration,
    min_interval: Duration,
    retries: u32,
    offline: bool,
    last_call: Option<Instant>,
    stats: ResolverStats,
}

impl<G: Geocoder> LocationResolver<G> {
    pub fn new(geocoder: G, config: &GeocoderConfig) -> Self {
        Self {
            geocoder,
            cache: GeocodeCache::new(config.cache_precision),
            timeout: config.timeout,
            min_interval: config.min_interval,
            retries: config.retries,
            offline: config.offline,
            last_call: None,
            stats: ResolverStats::default(),
        }
    }

    /// Seeds the resolver with a previously persisted cache.
    pub fn with_cache(mut self, cache: GeocodeCache) -> Self {
        self.cache = cache;
        self
    }

    /// Resolves a coordinate to a place label. Never fails: any lookup error
    /// yields an unknown location.
    pub async fn resolve(&mut self, lat: f64, lon: f64) -> LocationResult {
        if let Some(cached) = self.cache.get(lat, lon) {
            self.stats.cache_hits += 1;
            debug!("Cache hit for {}", self.cache.key(lat, lon));
            return to_location(cached.clone());
        }

        if self.offline {
            return LocationResult::unknown();
        }

        match self.lookup(lat, lon).await {
            Ok(label) => {
                self.cache.insert(lat, lon, label.clone());
                to_location(label)
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!("Location lookup failed for ({lat}, {lon}): {e}");
                LocationResult::unknown()
            }
        }
    }

    async fn lookup(&mut self, lat: f64, lon: f64) -> Result<Option<String>, ResolutionError> {
        let mut attempt = 0;
        loop {
            self.throttle().await;
            self.stats.lookups += 1;

            let result = tokio::time::timeout(self.timeout, self.geocoder.reverse(lat, lon))
                .await
                .unwrap_or(Err(ResolutionError::Timeout));

            match result {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    debug!("Retrying lookup for ({lat}, {lon}) after: {e}");
                }
                other => return other,
            }
        }
    }

    /// Waits until `min_interval` has passed since the previous call.
    async fn throttle(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Throttling geocoder for {wait:?}");
                tokio::time::sleep(wait).await;
            }
        }
        self.last_call = Some(Instant::now());
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    pub fn into_cache(self) -> GeocodeCache {
        self.cache
    }
}

fn to_location(label: Option<String>) -> LocationResult {
    label.map_or_else(LocationResult::unknown, LocationResult::resolved)
}
