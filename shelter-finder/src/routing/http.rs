//! Evacuation backend `/compute-route` client.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::domain::{GeoPoint, RouteResult};
use crate::retry::RetryPolicy;

use super::RouteBackend;
use super::error::RouteError;
use super::types::{ComputeRouteRequest, ComputeRouteResponse, error_text};

/// Default backend URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Route computation endpoint, relative to the base URL.
const COMPUTE_ROUTE_PATH: &str = "/compute-route";

/// Default per-attempt timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 6;

/// Default retries after the first attempt.
const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default delay between attempts.
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RouteClientConfig {
    /// Base URL of the evacuation backend
    pub base_url: String,
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl RouteClientConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the retry budget.
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between attempts.
    pub fn with_retry_delay(mut self, millis: u64) -> Self {
        self.retry_delay_ms = millis;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.max_retries,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

impl Default for RouteClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-attempt client for `POST {base_url}/compute-route`.
#[derive(Debug, Clone)]
pub struct HttpRouteBackend {
    http: reqwest::Client,
    url: String,
}

impl HttpRouteBackend {
    pub fn new(config: &RouteClientConfig) -> Result<Self, RouteError> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                COMPUTE_ROUTE_PATH
            ),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RouteBackend for HttpRouteBackend {
    async fn request_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResult, RouteError> {
        let body = ComputeRouteRequest {
            origin,
            destination,
        };

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, text));
        }

        let parsed: ComputeRouteResponse =
            serde_json::from_str(&text).map_err(|e| RouteError::Json {
                message: e.to_string(),
                body: Some(text.chars().take(500).collect()),
            })?;

        if let Some(message) = parsed.error_message() {
            return Err(RouteError::Rejected(message));
        }

        let route = parsed.into_route();
        debug!(
            %origin,
            %destination,
            duration_seconds = ?route.duration_seconds,
            "route computed"
        );
        Ok(route)
    }
}

/// Map a non-success response to an error.
///
/// Client errors that explain themselves with an `error` body are
/// rejections. Server errors, throttling and unexplained failures are
/// transient.
pub(super) fn classify_failure(status: StatusCode, body: String) -> RouteError {
    let transient = status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS;

    if !transient {
        let explained = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(error_text));
        if let Some(message) = explained {
            return RouteError::Rejected(message);
        }
    }

    RouteError::Api {
        status: status.as_u16(),
        message: body.chars().take(500).collect(),
    }
}
