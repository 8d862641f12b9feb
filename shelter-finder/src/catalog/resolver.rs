//! Picks the candidate list for a request.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::Candidate;

use super::error::CatalogError;
use super::raw::RawDataset;

/// File name of the dataset written by the batch geocoder.
pub const GEOCODED_FILE: &str = "florida_shelters_geocoded.json";

/// File name of the raw county-grouped dataset.
pub const RAW_FILE: &str = "florida_shelters.json";

/// Default directory holding both datasets.
const DEFAULT_DATA_DIR: &str = "simulation";

/// Default suffix appended to composed addresses.
const DEFAULT_REGION_SUFFIX: &str = "FL";

/// Where the fallback datasets live.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Geocoded dataset (JSON array of shelter records)
    pub geocoded_path: PathBuf,
    /// Raw dataset (county name to list of entries)
    pub raw_path: PathBuf,
    /// Appended to addresses composed from raw entries
    pub region_suffix: String,
}

impl CatalogConfig {
    /// Use the standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            geocoded_path: dir.join(GEOCODED_FILE),
            raw_path: dir.join(RAW_FILE),
            region_suffix: DEFAULT_REGION_SUFFIX.to_string(),
        }
    }

    pub fn with_region_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.region_suffix = suffix.into();
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

/// Supplies candidates when the caller did not.
#[derive(Debug, Clone, Default)]
pub struct ShelterCatalogResolver {
    config: CatalogConfig,
}

impl ShelterCatalogResolver {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Return `explicit` if it is non-empty, otherwise the fallback dataset.
    pub fn resolve(&self, explicit: Vec<Candidate>) -> Result<Vec<Candidate>, CatalogError> {
        if !explicit.is_empty() {
            return Ok(explicit);
        }
        self.load_fallback()
    }

    /// Load the geocoded dataset, or the raw one if it does not exist.
    ///
    /// A geocoded file that exists but cannot be parsed is an error; it is
    /// never skipped in favour of the raw dataset.
    pub fn load_fallback(&self) -> Result<Vec<Candidate>, CatalogError> {
        let CatalogConfig {
            geocoded_path,
            raw_path,
            region_suffix,
        } = &self.config;

        if geocoded_path.exists() {
            let candidates = load_geocoded(geocoded_path)?;
            info!(
                path = %geocoded_path.display(),
                count = candidates.len(),
                "loaded geocoded shelters"
            );
            return Ok(candidates);
        }

        if raw_path.exists() {
            let candidates = load_raw(raw_path)?.candidates(region_suffix);
            info!(
                path = %raw_path.display(),
                count = candidates.len(),
                resolved = candidates.iter().filter(|c| c.is_resolved()).count(),
                "loaded raw shelters"
            );
            return Ok(candidates);
        }

        Err(CatalogError::Missing {
            geocoded: geocoded_path.clone(),
            raw: raw_path.clone(),
        })
    }
}

/// Read a JSON array of shelter records.
pub fn load_geocoded(path: &Path) -> Result<Vec<Candidate>, CatalogError> {
    debug!(path = %path.display(), "reading geocoded dataset");
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::GeocodedRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CatalogError::GeocodedParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the county-grouped raw dataset.
pub fn load_raw(path: &Path) -> Result<RawDataset, CatalogError> {
    debug!(path = %path.display(), "reading raw dataset");
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::RawRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CatalogError::RawParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }

    fn resolver(dir: &TempDir) -> ShelterCatalogResolver {
        ShelterCatalogResolver::new(CatalogConfig::in_dir(dir.path()))
    }

    #[test]
    fn explicit_candidates_win() {
        let dir = TempDir::new().unwrap();
        let explicit = vec![Candidate::new("Mine", "here")];

        let resolved = resolver(&dir).resolve(explicit.clone()).unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn prefers_geocoded_dataset() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            GEOCODED_FILE,
            &json!([
                {"name": "G1", "address": "a", "lat": 27.1, "lng": -81.1, "county": "Polk"},
                {"name": "G2", "address": "b"}
            ])
            .to_string(),
        );
        write(&dir, RAW_FILE, &json!({"Polk": [{"name": "R1"}]}).to_string());

        let resolved = resolver(&dir).resolve(Vec::new()).unwrap();
        let names: Vec<_> = resolved.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["G1", "G2"]);
        assert_eq!(resolved[0].point, Some(GeoPoint { lat: 27.1, lng: -81.1 }));
        assert_eq!(resolved[0].extra.get("county"), Some(&json!("Polk")));
        assert!(!resolved[1].is_resolved());
    }

    #[test]
    fn corrupt_geocoded_dataset_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, GEOCODED_FILE, "[{\"name\": ");
        write(&dir, RAW_FILE, &json!({"Polk": [{"name": "R1"}]}).to_string());

        let err = resolver(&dir).resolve(Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::GeocodedParse { .. }));
    }

    #[test]
    fn falls_back_to_raw_dataset() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            RAW_FILE,
            &json!({
                "Polk": [{"facility": "Gym", "street_address": "9 Elm", "latitude": "28.0", "longitude": "-81.0"}],
                "Alachua": [{"name": "Hall"}]
            })
            .to_string(),
        );

        let resolved = resolver(&dir).resolve(Vec::new()).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "Gym");
        assert_eq!(resolved[0].address, "9 Elm, Polk, FL");
        assert!(resolved[0].is_resolved());
        assert_eq!(resolved[1].address, "Alachua, FL");
        assert!(!resolved[1].is_resolved());
    }

    #[test]
    fn malformed_raw_dataset_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, RAW_FILE, "[]");

        let err = resolver(&dir).resolve(Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::RawParse { .. }));
    }

    #[test]
    fn missing_datasets_name_both_paths() {
        let dir = TempDir::new().unwrap();

        let err = resolver(&dir).resolve(Vec::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(GEOCODED_FILE));
        assert!(message.contains(RAW_FILE));
    }

    #[test]
    fn empty_geocoded_dataset_is_returned_as_is() {
        let dir = TempDir::new().unwrap();
        write(&dir, GEOCODED_FILE, "[]");

        let resolved = resolver(&dir).resolve(Vec::new()).unwrap();
        assert!(resolved.is_empty());
    }
}
