//! The raw shelter dataset: entries grouped by county.
//!
//! Entries are loosely shaped. A shelter is named by `name` or `facility`,
//! its street comes from `street_address` or `address`, and coordinates may be
//! spelled `lat`/`latitude` and `lng`/`longitude`, as numbers or strings.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{Candidate, GeoPoint, UNNAMED, parse_coordinate};

/// Raw dataset, regions in file order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RawDataset {
    regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq)]
struct Region {
    name: String,
    entries: Vec<Map<String, Value>>,
}

impl TryFrom<Map<String, Value>> for RawDataset {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let regions = map
            .into_iter()
            .map(|(name, entries)| {
                Ok(Region {
                    name,
                    entries: serde_json::from_value(entries)?,
                })
            })
            .collect::<Result<_, serde_json::Error>>()?;
        Ok(Self { regions })
    }
}

impl RawDataset {
    /// Every entry, region by region.
    pub fn entries(&self) -> impl Iterator<Item = RawEntry<'_>> {
        self.regions.iter().flat_map(|region| {
            region.entries.iter().map(move |fields| RawEntry {
                region: &region.name,
                fields,
            })
        })
    }

    /// Number of entries across all regions.
    pub fn len(&self) -> usize {
        self.regions.iter().map(|r| r.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into ranking candidates.
    pub fn candidates(&self, suffix: &str) -> Vec<Candidate> {
        self.entries().map(|e| e.to_candidate(suffix)).collect()
    }

    /// Flatten into geocoding work items, keeping every raw field.
    pub fn geocode_items(&self, suffix: &str) -> Vec<Candidate> {
        self.entries().map(|e| e.to_geocode_item(suffix)).collect()
    }
}

/// One entry of the raw dataset together with its region.
#[derive(Debug, Clone, Copy)]
pub struct RawEntry<'a> {
    pub region: &'a str,
    pub fields: &'a Map<String, Value>,
}

impl RawEntry<'_> {
    fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    fn coordinate(&self, keys: [&str; 2]) -> Option<f64> {
        keys.iter()
            .find_map(|k| self.fields.get(*k).filter(|v| !v.is_null()))
            .and_then(parse_coordinate)
    }

    /// `name`, else `facility`, else [`UNNAMED`].
    pub fn display_name(&self) -> &str {
        self.text("name")
            .or_else(|| self.text("facility"))
            .unwrap_or(UNNAMED)
    }

    /// `street_address`, else `address`, else empty.
    pub fn street(&self) -> &str {
        self.text("street_address")
            .or_else(|| self.text("address"))
            .unwrap_or_default()
    }

    /// `"{street}, {region}, {suffix}"`, or `"{region}, {suffix}"` without a
    /// street.
    pub fn address(&self, suffix: &str) -> String {
        match self.street() {
            "" => format!("{}, {}", self.region, suffix),
            street => format!("{}, {}, {}", street, self.region, suffix),
        }
    }

    /// Coordinates, if both are present and usable.
    pub fn point(&self) -> Option<GeoPoint> {
        let lat = self.coordinate(["lat", "latitude"])?;
        let lng = self.coordinate(["lng", "longitude"])?;
        GeoPoint::new(lat, lng).ok()
    }

    /// The entry as a ranking candidate.
    pub fn to_candidate(&self, suffix: &str) -> Candidate {
        let candidate = Candidate::new(self.display_name(), self.address(suffix));
        match self.point() {
            Some(point) => candidate.with_point(point),
            None => candidate,
        }
    }

    /// The entry as a geocoding work item: all raw fields plus `county` and
    /// the composed address.
    pub fn to_geocode_item(&self, suffix: &str) -> Candidate {
        let mut fields = self.fields.clone();
        fields.insert("county".to_string(), Value::from(self.region));
        Candidate::from_fields(self.display_name(), self.address(suffix), fields)
    }
}
