//! Retrying route client.

use std::time::Duration;

use tracing::debug;

use crate::domain::{GeoPoint, RouteResult};
use crate::retry::{RetryError, RetryPolicy};

use super::error::RouteError;
use super::http::{HttpRouteBackend, RouteClientConfig};
use super::{RouteBackend, RouteProvider};

/// Route provider with validation, per-attempt timeout and retries.
///
/// Stateless between calls; clone or share it freely.
#[derive(Debug, Clone)]
pub struct RouteClient<B = HttpRouteBackend> {
    backend: B,
    policy: RetryPolicy,
    timeout: Duration,
}

impl RouteClient<HttpRouteBackend> {
    /// Create a client for the evacuation backend's `/compute-route`.
    pub fn new(config: RouteClientConfig) -> Result<Self, RouteError> {
        let backend = HttpRouteBackend::new(&config)?;
        Ok(Self::with_backend(
            backend,
            config.retry_policy(),
            config.timeout(),
        ))
    }
}

impl<B: RouteBackend> RouteClient<B> {
    /// Wrap an arbitrary backend.
    pub fn with_backend(backend: B, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            backend,
            policy,
            timeout,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResult, RouteError> {
        match tokio::time::timeout(
            self.timeout,
            self.backend.request_route(origin, destination),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RouteError::Timeout(self.timeout)),
        }
    }
}

impl<B: RouteBackend> RouteProvider for RouteClient<B> {
    async fn get_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResult, RouteError> {
        origin
            .validate()
            .map_err(|source| RouteError::InvalidInput {
                which: "origin",
                source,
            })?;
        destination
            .validate()
            .map_err(|source| RouteError::InvalidInput {
                which: "destination",
                source,
            })?;

        debug!(%origin, %destination, "requesting route");

        self.policy
            .run(|_| self.attempt(origin, destination))
            .await
            .map_err(|e| match e {
                RetryError::Fatal { error, .. } => error,
                RetryError::Exhausted { attempts, last } => RouteError::Exhausted {
                    attempts,
                    last: Box::new(last),
                },
            })
    }
}
