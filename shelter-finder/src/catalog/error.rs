//! Shelter catalog error types.

use std::path::PathBuf;

/// Errors from loading a fallback shelter dataset.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The geocoded dataset exists but could not be read
    #[error("failed to read geocoded dataset {}: {source}", path.display())]
    GeocodedRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The geocoded dataset is not a JSON array of shelter records
    #[error("geocoded dataset {} is corrupt: {source}", path.display())]
    GeocodedParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The raw dataset could not be read
    #[error("failed to read raw dataset {}: {source}", path.display())]
    RawRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The raw dataset is not a mapping of region to entry lists
    #[error("raw dataset {} is malformed: {source}", path.display())]
    RawParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Neither dataset exists
    #[error(
        "no shelter dataset found (looked for {} and {})",
        geocoded.display(),
        raw.display()
    )]
    Missing { geocoded: PathBuf, raw: PathBuf },
}
