//! Google Geocoding API client.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::domain::GeoPoint;

use super::Geocoder;
use super::error::GeocodeError;

/// Default geocoding endpoint.
const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Maps Platform API key
    pub api_key: String,
    /// Full URL of the geocode JSON endpoint
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocoderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// Single-attempt geocoder backed by the Google Geocoding API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    config: GeocoderConfig,
}

impl GoogleGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        if config.api_key.is_empty() {
            return Err(GeocodeError::NotConfigured(
                "GOOGLE_MAPS_API_KEY not set".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }
}

impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[("address", address), ("key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        let location = match parsed.results.into_iter().next() {
            Some(result) if parsed.status == "OK" => result.geometry.location,
            _ => {
                return Err(GeocodeError::Status {
                    status: parsed.status,
                    address: address.to_string(),
                });
            }
        };

        let point = GeoPoint::new(location.lat, location.lng).map_err(|source| {
            GeocodeError::InvalidLocation {
                address: address.to_string(),
                source,
            }
        })?;
        debug!(address, %point, "geocoded");
        Ok(point)
    }
}

/// Geocoder for dry runs, where no lookup may happen.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl Geocoder for OfflineGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        Err(GeocodeError::NotConfigured(format!(
            "offline geocoder cannot resolve {address}"
        )))
    }
}
