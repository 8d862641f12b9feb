//! Wire types for routing backends.
//!
//! Two shapes live here: the evacuation backend's own `/compute-route`
//! contract, and the subset of Google's Routes API that we read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{GeoPoint, RouteResult};

// ── /compute-route ───────────────────────────────────────────────────────────

/// Request body for `/compute-route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

/// Response body for `/compute-route`.
///
/// Either a route summary or an `error` describing why the backend refused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComputeRouteResponse {
    #[serde(default)]
    pub distance_meters: Option<u64>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub polyline: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ComputeRouteResponse {
    /// The backend's error message, if it reported one.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().and_then(error_text)
    }

    pub fn into_route(self) -> RouteResult {
        RouteResult {
            distance_meters: self.distance_meters,
            duration_seconds: self.duration_seconds,
            polyline: self.polyline,
        }
    }
}

/// Render an `error` field as text. Empty or falsy values count as no error.
pub(crate) fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => Some(
            obj.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

// ── Google Routes API ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRoutesRequest {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub travel_mode: &'static str,
    pub routing_preference: &'static str,
    pub compute_alternatives: bool,
}

impl GoogleRoutesRequest {
    /// A driving, traffic-aware request for a single route.
    pub fn driving(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            origin: Waypoint::at(origin),
            destination: Waypoint::at(destination),
            travel_mode: "DRIVE",
            routing_preference: "TRAFFIC_AWARE",
            compute_alternatives: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Waypoint {
    pub location: Location,
}

impl Waypoint {
    fn at(point: GeoPoint) -> Self {
        Self {
            location: Location {
                lat_lng: LatLng {
                    latitude: point.lat,
                    longitude: point.lng,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleRoutesResponse {
    #[serde(default)]
    pub routes: Vec<GoogleRoute>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleRoute {
    #[serde(default)]
    pub legs: Vec<GoogleLeg>,
    #[serde(default)]
    pub polyline: Option<GooglePolyline>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLeg {
    #[serde(default)]
    pub distance_meters: Option<u64>,
    /// `"123s"`, a bare number, or `{"seconds": 123}` depending on the API
    /// version.
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub travel_time: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePolyline {
    #[serde(default)]
    pub encoded_polyline: Option<String>,
    #[serde(default)]
    pub points: Option<String>,
}

impl GoogleLeg {
    /// Leg duration in whole seconds; unknown formats count as zero.
    pub fn duration_seconds(&self) -> u64 {
        self.duration
            .as_ref()
            .filter(|v| !v.is_null())
            .or(self.travel_time.as_ref())
            .and_then(parse_duration)
            .unwrap_or(0)
    }
}

impl GoogleRoutesResponse {
    /// Summarize the first route, summing its legs.
    ///
    /// No routes means no route information, not a zero-length trip.
    pub fn summarize(self) -> RouteResult {
        let Some(route) = self.routes.into_iter().next() else {
            return RouteResult::empty();
        };

        let distance = route
            .legs
            .iter()
            .map(|leg| leg.distance_meters.unwrap_or(0))
            .sum();
        let duration = route.legs.iter().map(GoogleLeg::duration_seconds).sum();
        let polyline = route
            .polyline
            .and_then(|p| p.encoded_polyline.or(p.points));

        RouteResult {
            distance_meters: Some(distance),
            duration_seconds: Some(duration),
            polyline,
        }
    }
}

fn parse_duration(value: &Value) -> Option<u64> {
    let secs = match value {
        Value::String(s) => s.trim().trim_end_matches('s').parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        Value::Object(obj) => match obj.get("seconds")? {
            Value::String(s) => s.parse::<f64>().ok()?,
            other => other.as_f64()?,
        },
        _ => return None,
    };
    (secs.is_finite() && secs >= 0.0).then(|| secs.round() as u64)
}
