//! Shelter candidates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::point::{GeoPoint, parse_coordinate};

/// Name used when a record carries no usable name.
pub const UNNAMED: &str = "Unnamed";

/// A shelter under consideration.
///
/// Records travel as flat JSON objects: `name`, `address`, optional `lat` and
/// `lng`, plus any other fields, which are carried through untouched in
/// `extra`. A candidate whose coordinates are missing or unusable has no
/// `point` and is never routed to.
///
/// Candidates have no stable identity; their position in the input decides
/// ties during ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CandidateRecord", into = "CandidateRecord")]
pub struct Candidate {
    pub name: String,
    pub address: String,
    pub point: Option<GeoPoint>,
    pub extra: Map<String, Value>,
}

/// Deduplication key for geocoding checkpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    pub name: String,
    pub address: String,
}

impl Candidate {
    /// Create an unresolved candidate with no extra fields.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            point: None,
            extra: Map::new(),
        }
    }

    /// Attach coordinates.
    pub fn with_point(mut self, point: GeoPoint) -> Self {
        self.point = Some(point);
        self
    }

    /// Build a candidate from a name, an address and the remaining record
    /// fields.
    ///
    /// `lat` and `lng` are lifted out of `fields` when both parse into a valid
    /// point. Otherwise they stay in `extra` verbatim so nothing is lost when
    /// the record is written back out. Any `name` or `address` entries in
    /// `fields` are superseded by the arguments.
    pub fn from_fields(
        name: impl Into<String>,
        address: impl Into<String>,
        mut fields: Map<String, Value>,
    ) -> Self {
        fields.shift_remove("name");
        fields.shift_remove("address");
        let point = match (fields.get("lat"), fields.get("lng")) {
            (Some(lat), Some(lng)) => parse_coordinate(lat)
                .zip(parse_coordinate(lng))
                .and_then(|(lat, lng)| GeoPoint::new(lat, lng).ok()),
            _ => None,
        };
        if point.is_some() {
            fields.shift_remove("lat");
            fields.shift_remove("lng");
        }
        Self {
            name: name.into(),
            address: address.into(),
            point,
            extra: fields,
        }
    }

    /// Whether the candidate has usable coordinates.
    pub fn is_resolved(&self) -> bool {
        self.point.is_some()
    }

    /// The `(name, address)` pair used to recognise already processed records.
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }
}

/// Flat wire form of a candidate.
///
/// `name` and `address` stay loosely typed so one malformed record does not
/// fail a whole dataset.
#[derive(Serialize, Deserialize)]
struct CandidateRecord {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    address: Option<Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

impl From<CandidateRecord> for Candidate {
    fn from(record: CandidateRecord) -> Self {
        let name = non_empty_str(record.name.as_ref())
            .or_else(|| non_empty_str(record.fields.get("facility")))
            .unwrap_or(UNNAMED)
            .to_string();
        let address = non_empty_str(record.address.as_ref())
            .unwrap_or_default()
            .to_string();
        Candidate::from_fields(name, address, record.fields)
    }
}

impl From<Candidate> for CandidateRecord {
    fn from(candidate: Candidate) -> Self {
        let mut fields = candidate.extra;
        if let Some(point) = candidate.point {
            fields.insert("lat".to_string(), Value::from(point.lat));
            fields.insert("lng".to_string(), Value::from(point.lng));
        }
        CandidateRecord {
            name: Some(Value::String(candidate.name)),
            address: Some(Value::String(candidate.address)),
            fields,
        }
    }
}
