//! Tunables for [`LeaderboardAggregator`](crate::LeaderboardAggregator).

use std::time::Duration;

const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);

/// Configuration for [`LeaderboardAggregator`](crate::LeaderboardAggregator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardConfig {
    /// Lifetime of cached leaderboard lists.
    pub leaderboard_ttl: Duration,
    /// Lifetime of cached ranks.
    pub rank_ttl: Duration,
    /// Largest list size served; larger requests are clamped.
    pub max_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            leaderboard_ttl: FIVE_MINUTES,
            rank_ttl: FIVE_MINUTES,
            max_limit: 100,
        }
    }
}

impl LeaderboardConfig {
    /// Override the list cache lifetime.
    #[must_use]
    pub const fn with_leaderboard_ttl(mut self, ttl: Duration) -> Self {
        self.leaderboard_ttl = ttl;
        self
    }

    /// Override the rank cache lifetime.
    #[must_use]
    pub const fn with_rank_ttl(mut self, ttl: Duration) -> Self {
        self.rank_ttl = ttl;
        self
    }

    /// Override the largest list size.
    #[must_use]
    pub const fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }
}
