//! Shelter ranking by estimated time of arrival.
//!
//! Routes to every candidate with coordinates, scores each by ETA and picks
//! the best. Routing failures for individual candidates are absorbed; only an
//! empty candidate list or an invalid origin fails the ranking as a whole.

mod config;
mod ranker;
mod score;

pub use config::RankingConfig;
pub use ranker::{CandidateRanker, RankingError, RankingOutcome};
pub use score::{ScoredCandidate, rank_scored, score_from_duration};
