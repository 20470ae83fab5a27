//! Eviction of cached leaderboard state after a score update.
//!
//! The cache only supports deletion by exact key, so after a write the
//! affected keys are enumerated rather than matched by pattern. For a score
//! recorded on date `d` the manager evicts, for the affected game:
//!
//! - leaderboard lists for the daily periods of `d` and the day before it
//!   (covering writes that race midnight), the month of `d` and all time,
//!   each at every limit in [`CacheInvalidationManager::limits`];
//! - the scoring actor's rank for each of those periods.
//!
//! Anything else stays cached until its own TTL expires. A list requested
//! with an uncommon limit may therefore lag a write by up to the
//! leaderboard TTL, and other actors' ranks by up to the rank TTL. Both
//! windows are bounded by configuration.

use chrono::NaiveDate;
use letterbox_core::cache::evict;
use letterbox_core::{ActorId, Cache, GameId, Period};

use crate::keys::{COMMON_LIMITS, leaderboard_key, rank_key};

/// Enumerates and evicts the cache keys a score update can affect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInvalidationManager {
    limits: Vec<usize>,
}

impl Default for CacheInvalidationManager {
    fn default() -> Self {
        Self::new(COMMON_LIMITS)
    }
}

impl CacheInvalidationManager {
    /// Invalidate lists cached at each of `limits`.
    pub fn new(limits: impl IntoIterator<Item = usize>) -> Self {
        let mut collected: Vec<usize> = limits.into_iter().collect();
        collected.sort_unstable();
        collected.dedup();
        Self { limits: collected }
    }

    /// List sizes whose cached lists are invalidated.
    #[must_use]
    pub fn limits(&self) -> &[usize] {
        &self.limits
    }

    /// Every key affected by a score `actor` recorded in `game` on `date`.
    #[must_use]
    pub fn keys_for(&self, game: &GameId, actor: &ActorId, date: NaiveDate) -> Vec<String> {
        let periods = affected_periods(date);
        let lists = periods.iter().flat_map(|period| {
            self.limits
                .iter()
                .map(move |&limit| leaderboard_key(game, period, limit))
        });
        let ranks = periods.iter().map(|period| rank_key(game, actor, period));
        lists.chain(ranks).collect()
    }

    /// Evict every affected key, returning how many deletions were
    /// attempted. Failed deletions are logged and do not stop the sweep.
    pub fn invalidate<C>(&self, cache: &C, game: &GameId, actor: &ActorId, date: NaiveDate) -> usize
    where
        C: Cache + ?Sized,
    {
        let keys = self.keys_for(game, actor, date);
        let failed = keys.iter().filter(|key| !evict(cache, key)).count();
        if failed > 0 {
            log::warn!(
                "{failed} of {} leaderboard cache keys for {game} could not be evicted; \
                 they expire with their TTL",
                keys.len()
            );
        }
        keys.len()
    }
}

fn affected_periods(date: NaiveDate) -> Vec<Period> {
    let mut periods = vec![Period::daily(date)];
    if let Some(previous) = date.pred_opt() {
        periods.push(Period::daily(previous));
    }
    periods.push(Period::monthly(date));
    periods.push(Period::AllTime);
    periods
}
