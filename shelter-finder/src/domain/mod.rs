//! Domain types for shelter selection.
//!
//! Candidates, coordinates and routing summaries shared by the ranking,
//! catalog and geocoding layers.

mod candidate;
mod error;
mod point;
mod route;

pub use candidate::{Candidate, CandidateKey, UNNAMED};
pub use error::DomainError;
pub use point::{GeoPoint, parse_coordinate};
pub use route::RouteResult;
