//! Geographic coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DomainError;

/// A WGS84 coordinate pair.
///
/// A `GeoPoint` built through [`GeoPoint::new`] is always finite and within
/// range. Points arriving over the wire are deserialized as-is, so callers that
/// hand them to a remote service check [`GeoPoint::validate`] first.
///
/// # Examples
///
/// ```
/// use shelter_finder::domain::GeoPoint;
///
/// let point = GeoPoint::new(27.6648, -81.5158).unwrap();
/// assert_eq!(point.lat, 27.6648);
///
/// assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Check that both coordinates are finite and within range.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(DomainError::InvalidCoordinate {
                field: "lat",
                value: self.lat,
            });
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(DomainError::InvalidCoordinate {
                field: "lng",
                value: self.lng,
            });
        }
        Ok(())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Read a single coordinate from a loosely typed JSON value.
///
/// Datasets carry coordinates either as numbers or as numeric strings.
/// Anything else (null, empty strings, garbage) yields `None`.
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}
