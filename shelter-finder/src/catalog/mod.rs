//! Fallback shelter datasets.
//!
//! When a request carries no shelters, candidates come from disk: the
//! geocoded dataset produced by the batch geocoder if it exists, otherwise
//! the raw dataset of shelters grouped by county.

mod error;
mod raw;
mod resolver;

pub use error::CatalogError;
pub use raw::{RawDataset, RawEntry};
pub use resolver::{
    CatalogConfig, GEOCODED_FILE, RAW_FILE, ShelterCatalogResolver, load_geocoded, load_raw,
};
