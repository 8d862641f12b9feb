//! Routing client error types.

use std::time::Duration;

use crate::domain::DomainError;
use crate::retry::Retryable;

/// Errors from routing backends and the retrying client.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Origin or destination is unusable; no request was made
    #[error("invalid {which}: {source}")]
    InvalidInput {
        which: &'static str,
        source: DomainError,
    },

    /// HTTP request failed (network error, connection refused, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single attempt took longer than the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Backend returned a non-success status that may be transient
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Backend answered but explicitly refused the request
    #[error("backend error: {0}")]
    Rejected(String),

    /// Response body could not be decoded
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Backend is missing required configuration
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Retry budget exhausted
    #[error("request failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<RouteError>,
    },
}

impl Retryable for RouteError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            RouteError::Http(_) | RouteError::Timeout(_) | RouteError::Api { .. }
        )
    }
}
