//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::domain::{Candidate, GeoPoint};
use crate::ranking::RankingOutcome;

/// Body of `POST /best-shelter`.
#[derive(Debug, Clone, Deserialize)]
pub struct BestShelterRequest {
    pub origin: GeoPoint,
    /// Candidates to rank; the fallback dataset is used when empty or absent
    #[serde(default)]
    pub shelters: Option<Vec<Candidate>>,
}

/// Response of `POST /best-shelter`.
#[derive(Debug, Clone, Serialize)]
pub struct BestShelterResponse {
    pub best: BestShelter,
}

/// The chosen shelter with its route summary.
#[derive(Debug, Clone, Serialize)]
pub struct BestShelter {
    pub shelter: Candidate,
    pub eta_seconds: Option<u64>,
    pub distance_meters: Option<u64>,
    pub polyline: Option<String>,
}

impl From<RankingOutcome> for BestShelter {
    fn from(outcome: RankingOutcome) -> Self {
        Self {
            shelter: outcome.best,
            eta_seconds: outcome.route.duration_seconds,
            distance_meters: outcome.route.distance_meters,
            polyline: outcome.route.polyline,
        }
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `ready` or `unavailable`
    pub agent: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_model: Option<String>,
    /// Whether `/compute-route` can reach Google Routes
    pub routes_configured: bool,
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
