//! Candidate ranking against a route provider.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Candidate, DomainError, GeoPoint, RouteResult};
use crate::routing::RouteProvider;

use super::config::RankingConfig;
use super::score::{ScoredCandidate, rank_scored};

/// Error from candidate ranking.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    /// The candidate list was empty
    #[error("no candidate shelters available")]
    NoCandidates,

    /// The origin cannot be routed from
    #[error("invalid origin: {0}")]
    InvalidOrigin(#[from] DomainError),
}

/// The selected shelter and the route to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingOutcome {
    pub best: Candidate,
    pub route: RouteResult,
}

/// Ranks candidates by ETA using a [`RouteProvider`].
pub struct CandidateRanker<P> {
    provider: P,
    config: RankingConfig,
}

impl<P: RouteProvider> CandidateRanker<P> {
    pub fn new(provider: P, config: RankingConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Route to every resolved candidate and return them best-first.
    ///
    /// Candidates without coordinates are left out. A failed lookup keeps the
    /// candidate with an empty route (score 0). At most
    /// `max_concurrent` lookups run at once; dropping the returned future
    /// cancels any still in flight.
    pub async fn rank_all(&self, origin: GeoPoint, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
        let resolved: Vec<(Candidate, GeoPoint)> = candidates
            .iter()
            .filter_map(|c| c.point.map(|point| (c.clone(), point)))
            .collect();

        let scored: Vec<ScoredCandidate> = stream::iter(resolved)
            .map(|(candidate, point)| self.score_one(origin, candidate, point))
            .buffered(self.config.concurrency())
            .collect()
            .await;

        debug!(
            total = candidates.len(),
            scored = scored.len(),
            "candidates scored"
        );

        rank_scored(scored)
    }

    async fn score_one(&self, origin: GeoPoint, candidate: Candidate, point: GeoPoint) -> ScoredCandidate {
        let route = match self.provider.get_route(origin, point).await {
            Ok(route) => route,
            Err(e) => {
                warn!(
                    shelter = %candidate.name,
                    error = %e,
                    "route lookup failed, scoring without a route"
                );
                RouteResult::empty()
            }
        };
        ScoredCandidate::new(candidate, route)
    }

    /// Select the best candidate for `origin`.
    ///
    /// If no candidate has coordinates, the first one is returned with an
    /// empty route rather than failing, whatever the origin. Otherwise an
    /// invalid origin is an error.
    pub async fn select_best(
        &self,
        origin: GeoPoint,
        candidates: &[Candidate],
    ) -> Result<RankingOutcome, RankingError> {
        let first = candidates.first().ok_or(RankingError::NoCandidates)?;

        if candidates.iter().all(|c| c.point.is_none()) {
            info!(
                shelter = %first.name,
                candidates = candidates.len(),
                "no candidate has coordinates, falling back to the first"
            );
            return Ok(RankingOutcome {
                best: first.clone(),
                route: RouteResult::empty(),
            });
        }

        origin.validate()?;

        let top = self
            .rank_all(origin, candidates)
            .await
            .into_iter()
            .next()
            .map(|top| RankingOutcome {
                best: top.candidate,
                route: top.route,
            })
            .unwrap_or_else(|| RankingOutcome {
                best: first.clone(),
                route: RouteResult::empty(),
            });

        info!(
            shelter = %top.best.name,
            eta_seconds = ?top.route.duration_seconds,
            "selected shelter"
        );
        Ok(top)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    use crate::routing::RouteError;

    struct DeltaLat;

    impl RouteProvider for DeltaLat {
        async fn get_route(
            &self,
            origin: GeoPoint,
            destination: GeoPoint,
        ) -> Result<RouteResult, RouteError> {
            let eta = ((origin.lat - destination.lat).abs() * 1000.0).round() as u64;
            Ok(RouteResult {
                distance_meters: None,
                duration_seconds: Some(eta),
                polyline: None,
            })
        }
    }

    fn candidates_strategy() -> impl Strategy<Value = Vec<Candidate>> {
        prop::collection::vec(prop::option::of(-80.0f64..80.0), 1..12).prop_map(|lats| {
            lats.into_iter()
                .enumerate()
                .map(|(i, lat)| {
                    let c = Candidate::new(format!("S{i}"), format!("{i} Main St"));
                    match lat {
                        Some(lat) => c.with_point(GeoPoint::new(lat, 0.0).unwrap()),
                        None => c,
                    }
                })
                .collect()
        })
    }

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(f)
    }

    proptest! {
        #[test]
        fn best_is_always_from_input(candidates in candidates_strategy()) {
            let ranker = CandidateRanker::new(DeltaLat, RankingConfig::default());
            let origin = GeoPoint::new(0.0, 0.0).unwrap();
            let outcome = block_on(ranker.select_best(origin, &candidates)).unwrap();

            prop_assert!(candidates.contains(&outcome.best));
            if candidates.iter().all(|c| !c.is_resolved()) {
                prop_assert_eq!(&outcome.best, &candidates[0]);
                prop_assert_eq!(outcome.route, RouteResult::empty());
            } else {
                prop_assert!(outcome.best.is_resolved());
            }
        }
    }
}
