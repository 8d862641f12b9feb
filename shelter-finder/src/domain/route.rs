//! Normalized routing results.

use serde::{Deserialize, Serialize};

/// Travel summary from an origin to one destination.
///
/// Every field is optional: a failed lookup and a response with no route both
/// produce a value with all fields absent, so ranking never has to tell the
/// two apart. A present `distance_meters` of zero is a genuine zero-length
/// route, not "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResult {
    pub distance_meters: Option<u64>,
    pub duration_seconds: Option<u64>,
    pub polyline: Option<String>,
}

impl RouteResult {
    /// A result with no route information.
    pub fn empty() -> Self {
        Self::default()
    }
}
