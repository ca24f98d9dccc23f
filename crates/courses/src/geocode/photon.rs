//! Photon (komoot) reverse-geocoding client.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::Geocoder;
use crate::config::GeocoderConfig;
use crate::errors::ResolutionError;

/// Feature properties consulted for a label, most specific first.
const PLACE_KEYS: [&str; 9] = [
    "city", "town", "village", "locality", "name", "district", "county", "state", "country",
];

/// Response from the Photon `/reverse` endpoint (a GeoJSON feature collection).
#[derive(Debug, Deserialize)]
struct PhotonResponse {
    #[serde(default)]
    features: Vec<PhotonFeature>,
}

#[derive(Debug, Deserialize)]
struct PhotonFeature {
    #[serde(default)]
    properties: HashMap<String, serde_json::Value>,
}

impl PhotonResponse {
    /// Most specific non-empty place descriptor of the first feature.
    fn place_label(&self) -> Option<String> {
        let properties = &self.features.first()?.properties;
        PLACE_KEYS.iter().find_map(|key| {
            properties
                .get(*key)
                .and_then(|value| value.as_str())
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(String::from)
        })
    }
}

/// Reverse geocoder backed by a Photon instance.
pub struct PhotonGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl PhotonGeocoder {
    /// Creates a client honouring the configured endpoint and timeout.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self, ResolutionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(concat!("gpx-courses/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.url.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for PhotonGeocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, ResolutionError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("lat", lat), ("lon", lon)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ResolutionError::RateLimited);
        }
        if !status.is_success() {
            return Err(ResolutionError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let parsed: PhotonResponse = serde_json::from_str(&text)?;
        Ok(parsed.place_label())
    }
}
