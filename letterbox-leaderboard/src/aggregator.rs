//! Per-period leaderboards with cached reads.

use chrono::NaiveDate;
use letterbox_core::cache::{read_json, write_json};
use letterbox_core::{
    ActorId, Cache, GameId, LeaderboardStore, Period, PeriodType, Rank, Standing,
};
use serde::Serialize;

use crate::keys::{leaderboard_key, rank_key};
use crate::{CacheInvalidationManager, LeaderboardConfig, LeaderboardError};

/// Stored scores after a [`LeaderboardAggregator::record_score`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordedScores {
    /// Daily entry for the score date.
    pub daily: u64,
    /// Monthly entry for the score date's month.
    pub monthly: u64,
    /// All-time entry.
    pub all_time: u64,
}

/// Accepts period scores on behalf of word submission.
pub trait ScoreRecorder: Send + Sync {
    /// Raise the actor's daily, monthly and all-time entries to at least
    /// `score`.
    ///
    /// # Errors
    /// Returns [`LeaderboardError`] when the store write fails.
    fn record_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        score: u64,
        date: NaiveDate,
    ) -> Result<RecordedScores, LeaderboardError>;
}

impl<R: ScoreRecorder + ?Sized> ScoreRecorder for std::sync::Arc<R> {
    fn record_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        score: u64,
        date: NaiveDate,
    ) -> Result<RecordedScores, LeaderboardError> {
        (**self).record_score(game, actor, score, date)
    }
}

/// Records scores into daily, monthly and all-time periods and answers
/// ranked queries.
///
/// Stored scores only ever rise: each write keeps the larger of the stored
/// and the submitted value, atomically at the store. Reads are cached for a
/// few minutes; writes evict the keys enumerated by
/// [`CacheInvalidationManager`].
pub struct LeaderboardAggregator<S, C> {
    store: S,
    cache: C,
    invalidation: CacheInvalidationManager,
    config: LeaderboardConfig,
}

impl<S: LeaderboardStore, C: Cache> LeaderboardAggregator<S, C> {
    /// Construct an aggregator using default configuration.
    pub fn new(store: S, cache: C) -> Self {
        Self::with_config(store, cache, LeaderboardConfig::default())
    }

    /// Construct an aggregator with explicit configuration.
    pub fn with_config(store: S, cache: C, config: LeaderboardConfig) -> Self {
        Self {
            store,
            cache,
            invalidation: CacheInvalidationManager::default(),
            config,
        }
    }

    /// Replace the invalidation manager.
    #[must_use]
    pub fn with_invalidation(mut self, invalidation: CacheInvalidationManager) -> Self {
        self.invalidation = invalidation;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// Raise the actor's entries for the periods containing `date` to at
    /// least `score` and evict the affected cache keys.
    ///
    /// # Errors
    /// Returns [`LeaderboardError::Store`] when a write fails. Cache
    /// failures are logged and ignored.
    pub fn record_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        score: u64,
        date: NaiveDate,
    ) -> Result<RecordedScores, LeaderboardError> {
        let [daily, monthly, all_time] = Period::all_for_date(date);
        let raise = |period: &Period| {
            self.store
                .raise_score(game, actor, period, score)
                .map_err(LeaderboardError::store("raise leaderboard score"))
        };
        let recorded = RecordedScores {
            daily: raise(&daily)?,
            monthly: raise(&monthly)?,
            all_time: raise(&all_time)?,
        };
        self.invalidation
            .invalidate(&self.cache, game, actor, date);
        Ok(recorded)
    }

    /// The top `limit` standings of a period, highest first.
    ///
    /// Equal scores are ordered by actor id. Limits above
    /// [`LeaderboardConfig::max_limit`] are clamped, and a limit of zero
    /// yields an empty list.
    ///
    /// # Errors
    /// Returns [`LeaderboardError::Store`] when the store read fails.
    pub fn leaderboard(
        &self,
        game: &GameId,
        period: &Period,
        limit: usize,
    ) -> Result<Vec<Standing>, LeaderboardError> {
        let clamped = limit.min(self.config.max_limit);
        if clamped == 0 {
            return Ok(Vec::new());
        }
        let key = leaderboard_key(game, period, clamped);
        if let Some(cached) = read_json(&self.cache, &key) {
            return Ok(cached);
        }
        let standings = self
            .store
            .top_scores(game, period, clamped)
            .map_err(LeaderboardError::store("list leaderboard"))?;
        write_json(&self.cache, &key, &standings, self.config.leaderboard_ttl);
        Ok(standings)
    }

    /// [`Self::leaderboard`] for a host-supplied period type and key.
    ///
    /// # Errors
    /// Returns [`LeaderboardError::Period`] when the pair is inconsistent.
    pub fn leaderboard_for(
        &self,
        game: &GameId,
        period_type: PeriodType,
        period_key: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Standing>, LeaderboardError> {
        let period = Period::from_parts(period_type, period_key)?;
        self.leaderboard(game, &period, limit)
    }

    /// The actor's rank in a period, or `None` when they have no entry.
    ///
    /// Rank is one more than the number of entries with a strictly higher
    /// score, so tied actors share a rank. Results may be served from cache
    /// for up to [`LeaderboardConfig::rank_ttl`].
    ///
    /// # Errors
    /// Returns [`LeaderboardError::Store`] when the store read fails.
    pub fn user_rank(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
    ) -> Result<Option<Rank>, LeaderboardError> {
        let key = rank_key(game, actor, period);
        if let Some(cached) = read_json::<_, Option<Rank>>(&self.cache, &key) {
            return Ok(cached);
        }
        self.user_rank_fresh(game, actor, period)
    }

    /// The actor's rank read directly from the store.
    ///
    /// The cached rank is refreshed with the result.
    ///
    /// # Errors
    /// Returns [`LeaderboardError::Store`] when the store read fails.
    pub fn user_rank_fresh(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
    ) -> Result<Option<Rank>, LeaderboardError> {
        let rank = self.compute_rank(game, actor, period)?;
        write_json(
            &self.cache,
            &rank_key(game, actor, period),
            &rank,
            self.config.rank_ttl,
        );
        Ok(rank)
    }

    /// [`Self::user_rank`] for a host-supplied period type and key.
    ///
    /// # Errors
    /// Returns [`LeaderboardError::Period`] when the pair is inconsistent.
    pub fn user_rank_for(
        &self,
        game: &GameId,
        actor: &ActorId,
        period_type: PeriodType,
        period_key: Option<&str>,
    ) -> Result<Option<Rank>, LeaderboardError> {
        let period = Period::from_parts(period_type, period_key)?;
        self.user_rank(game, actor, &period)
    }

    fn compute_rank(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
    ) -> Result<Option<Rank>, LeaderboardError> {
        let Some(entry) = self
            .store
            .find_entry(game, actor, period)
            .map_err(LeaderboardError::store("look up leaderboard entry"))?
        else {
            return Ok(None);
        };
        let higher = self
            .store
            .count_higher(game, period, entry.score)
            .map_err(LeaderboardError::store("count higher scores"))?;
        Ok(Some(Rank {
            rank: higher.saturating_add(1),
            score: entry.score,
        }))
    }
}

impl<S: LeaderboardStore, C: Cache> ScoreRecorder for LeaderboardAggregator<S, C> {
    fn record_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        score: u64,
        date: NaiveDate,
    ) -> Result<RecordedScores, LeaderboardError> {
        Self::record_score(self, game, actor, score, date)
    }
}
