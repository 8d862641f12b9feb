//! Ranking configuration.

/// Default number of route lookups in flight at once.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Configuration for candidate ranking.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Maximum concurrent route lookups.
    /// Keeps fan-out within the routing service's rate limits.
    pub max_concurrent: usize,
}

impl RankingConfig {
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent }
    }

    /// Effective concurrency, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        assert_eq!(RankingConfig::default().max_concurrent, 4);
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        assert_eq!(RankingConfig::new(0).concurrency(), 1);
        assert_eq!(RankingConfig::new(8).concurrency(), 8);
    }
}
