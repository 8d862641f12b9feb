//! Routing client.
//!
//! Obtains travel time and distance between two points from a remote
//! routing service. The layering is:
//!
//! - a [`RouteBackend`] makes exactly one remote request per call
//!   ([`HttpRouteBackend`] talks to the evacuation backend's
//!   `/compute-route`, [`GoogleRoutesBackend`] to Google's Routes API);
//! - [`RouteClient`] wraps a backend with input validation, a per-attempt
//!   timeout and a [`RetryPolicy`](crate::retry::RetryPolicy), and is the
//!   [`RouteProvider`] the ranker consumes.
//!
//! Nothing is cached: every call is a fresh remote request.

mod client;
mod error;
mod google;
mod http;
mod types;

use std::future::Future;

use crate::domain::{GeoPoint, RouteResult};

pub use client::RouteClient;
pub use error::RouteError;
pub use google::{GoogleRoutesBackend, GoogleRoutesConfig};
pub use http::{HttpRouteBackend, RouteClientConfig};
pub use types::{ComputeRouteRequest, ComputeRouteResponse};

/// One remote routing request, no retries.
pub trait RouteBackend: Send + Sync {
    fn request_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> impl Future<Output = Result<RouteResult, RouteError>> + Send;
}

/// Route lookups as seen by the ranker.
///
/// Implementations are stateless across calls and safe to call concurrently.
pub trait RouteProvider: Send + Sync {
    /// Travel summary from `origin` to `destination`.
    ///
    /// Fails immediately, without a remote call, if either point is invalid.
    fn get_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> impl Future<Output = Result<RouteResult, RouteError>> + Send;
}
