//! Google Routes API backend.
//!
//! Backs the server's own `/compute-route` endpoint. Requests a single
//! traffic-aware driving route and sums the legs of the first route.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::domain::{GeoPoint, RouteResult};

use super::RouteBackend;
use super::error::RouteError;
use super::http::classify_failure;
use super::types::{GoogleRoutesRequest, GoogleRoutesResponse};

/// Default base URL for the Routes API.
const DEFAULT_BASE_URL: &str = "https://routes.googleapis.com";

/// computeRoutes endpoint, relative to the base URL.
const COMPUTE_ROUTES_PATH: &str = "/directions/v2:computeRoutes";

/// Fields we read from the response.
const FIELD_MASK: &str =
    "routes.legs.distanceMeters,routes.legs.duration,routes.polyline.encodedPolyline";

/// Configuration for the Google Routes backend.
#[derive(Debug, Clone)]
pub struct GoogleRoutesConfig {
    /// Maps Platform API key
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GoogleRoutesConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Single-attempt Google Routes client.
#[derive(Debug, Clone)]
pub struct GoogleRoutesBackend {
    http: reqwest::Client,
    url: String,
}

impl GoogleRoutesBackend {
    pub fn new(config: GoogleRoutesConfig) -> Result<Self, RouteError> {
        if config.api_key.is_empty() {
            return Err(RouteError::NotConfigured(
                "GOOGLE_MAPS_API_KEY not set".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| RouteError::NotConfigured("invalid API key format".to_string()))?;
        headers.insert(HeaderName::from_static("x-goog-api-key"), api_key);
        headers.insert(
            HeaderName::from_static("x-goog-fieldmask"),
            HeaderValue::from_static(FIELD_MASK),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                COMPUTE_ROUTES_PATH
            ),
        })
    }
}

impl RouteBackend for GoogleRoutesBackend {
    async fn request_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResult, RouteError> {
        let request = GoogleRoutesRequest::driving(origin, destination);
        let response = self.http.post(&self.url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, body));
        }

        let parsed: GoogleRoutesResponse =
            serde_json::from_str(&body).map_err(|e| RouteError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        Ok(parsed.summarize())
    }
}
