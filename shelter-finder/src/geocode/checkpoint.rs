//! On-disk progress for batch geocoding.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{Candidate, CandidateKey};

use super::error::GeocodeError;

/// Ordered list of processed records, mirrored to a JSON array on disk.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
    records: Vec<Candidate>,
    keys: HashSet<CandidateKey>,
}

impl Checkpoint {
    /// Load the checkpoint at `path`, or start an empty one if it does not
    /// exist yet.
    ///
    /// A file that exists but does not parse is an error, so that progress is
    /// never silently overwritten.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, GeocodeError> {
        let path = path.into();
        let records: Vec<Candidate> = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                GeocodeError::CheckpointParse {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(GeocodeError::CheckpointRead { path, source }),
        };

        let keys = records.iter().map(Candidate::key).collect();
        debug!(path = %path.display(), records = records.len(), "checkpoint loaded");

        Ok(Self {
            path,
            records,
            keys,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[Candidate] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with this `(name, address)` is already present.
    pub fn contains(&self, key: &CandidateKey) -> bool {
        self.keys.contains(key)
    }

    /// Append a record and rewrite the file.
    pub fn append(&mut self, record: Candidate) -> Result<(), GeocodeError> {
        self.keys.insert(record.key());
        self.records.push(record);
        self.save()
    }

    /// Write all records to a sibling temp file, then rename it over the
    /// checkpoint.
    fn save(&self) -> Result<(), GeocodeError> {
        let write_err = |source| GeocodeError::CheckpointWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json =
            serde_json::to_string_pretty(&self.records).map_err(GeocodeError::CheckpointEncode)?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!(path = %self.path.display(), records = self.records.len(), "checkpoint saved");
        Ok(())
    }
}
