//! Batch geocoding of the raw shelter dataset.
//!
//! [`GeocodeBatchRunner`] walks the flattened dataset, resolves each address
//! through a [`Geocoder`] and appends the result to a [`Checkpoint`] file,
//! rewriting it after every item. Re-running against the same checkpoint
//! skips everything already recorded, so an interrupted run picks up where it
//! stopped.

mod checkpoint;
mod client;
mod error;
mod runner;

use std::future::Future;

use crate::domain::GeoPoint;

pub use checkpoint::Checkpoint;
pub use client::{GeocoderConfig, GoogleGeocoder, OfflineGeocoder};
pub use error::GeocodeError;
pub use runner::{GeocodeBatchRunner, RunOptions, RunSummary};

/// Resolves a postal address to coordinates.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str)
    -> impl Future<Output = Result<GeoPoint, GeocodeError>> + Send;
}
