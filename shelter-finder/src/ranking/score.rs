//! ETA scoring and candidate ordering.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{Candidate, RouteResult};

/// Score a travel duration. Higher is better.
///
/// `1 / (1 + seconds)`: 1.0 for an immediate arrival, strictly decreasing in
/// ETA, approaching zero for very long trips. An unknown duration scores 0,
/// below every known one.
pub fn score_from_duration(duration_seconds: Option<u64>) -> f64 {
    match duration_seconds {
        Some(secs) => 1.0 / (1.0 + secs as f64),
        None => 0.0,
    }
}

/// A candidate with its route and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub route: RouteResult,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn new(candidate: Candidate, route: RouteResult) -> Self {
        let score = score_from_duration(route.duration_seconds);
        Self {
            candidate,
            route,
            score,
        }
    }
}

/// Order two scored candidates, best first.
///
/// Score descending, then duration ascending with unknown durations last.
fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| {
        match (a.route.duration_seconds, b.route.duration_seconds) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// Sort scored candidates best-first.
///
/// The sort is stable, so candidates that tie on both keys keep their input
/// order.
pub fn rank_scored(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    scored.sort_by(compare);
    scored
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scored_strategy() -> impl Strategy<Value = Vec<(Option<u64>, usize)>> {
        prop::collection::vec(prop::option::of(0u64..5_000), 0..20)
            .prop_map(|ds| ds.into_iter().enumerate().map(|(i, d)| (d, i)).collect())
    }

    fn build(items: &[(Option<u64>, usize)]) -> Vec<ScoredCandidate> {
        items
            .iter()
            .map(|(d, i)| {
                ScoredCandidate::new(
                    Candidate::new(i.to_string(), String::new()),
                    RouteResult {
                        distance_meters: None,
                        duration_seconds: *d,
                        polyline: None,
                    },
                )
            })
            .collect()
    }

    proptest! {
        #[test]
        fn score_strictly_decreasing(d1 in 0u64..10_000_000, gap in 1u64..10_000_000) {
            let d2 = d1 + gap;
            prop_assert!(score_from_duration(Some(d1)) > score_from_duration(Some(d2)));
        }

        #[test]
        fn score_in_unit_interval(d in any::<u64>()) {
            let s = score_from_duration(Some(d));
            prop_assert!(s > 0.0 && s <= 1.0);
        }

        #[test]
        fn ranking_is_sorted_and_stable(items in scored_strategy()) {
            let ranked = rank_scored(build(&items));
            prop_assert_eq!(ranked.len(), items.len());

            for w in ranked.windows(2) {
                let key = |s: &ScoredCandidate| {
                    (
                        s.route.duration_seconds.unwrap_or(u64::MAX),
                        s.route.duration_seconds.is_none(),
                    )
                };
                let (a, b) = (&w[0], &w[1]);
                prop_assert!(key(a) <= key(b));

                // Equal keys must preserve input position.
                if a.route.duration_seconds == b.route.duration_seconds {
                    let ia: usize = a.candidate.name.parse().unwrap();
                    let ib: usize = b.candidate.name.parse().unwrap();
                    prop_assert!(ia < ib);
                }
            }
        }
    }
}
