//! Geocoding error types.

use std::path::PathBuf;

use crate::domain::DomainError;
use crate::retry::Retryable;

/// Errors from geocoding lookups and batch runs.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Geocoding service returned a non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Service answered but found nothing usable
    #[error("geocode failed: {status} for {address}")]
    Status { status: String, address: String },

    /// Service returned coordinates out of range
    #[error("invalid location for {address}: {source}")]
    InvalidLocation {
        address: String,
        source: DomainError,
    },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// No API key available
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Checkpoint exists but could not be read
    #[error("failed to read checkpoint {}: {source}", path.display())]
    CheckpointRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Checkpoint is not a JSON array of records
    #[error("checkpoint {} is corrupt: {source}", path.display())]
    CheckpointParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Checkpoint could not be written
    #[error("failed to write checkpoint {}: {source}", path.display())]
    CheckpointWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Checkpoint records could not be serialized
    #[error("failed to encode checkpoint: {0}")]
    CheckpointEncode(serde_json::Error),
}

impl Retryable for GeocodeError {
    /// Lookup failures are retried; local I/O and configuration problems are not.
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeocodeError::Http(_)
                | GeocodeError::Api { .. }
                | GeocodeError::Status { .. }
                | GeocodeError::InvalidLocation { .. }
                | GeocodeError::Json { .. }
        )
    }
}
