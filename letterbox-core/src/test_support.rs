//! Test doubles for the store, cache and clock capabilities.
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for downstream crates' tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::store::distinct_words;
use crate::{
    ActorId, Cache, CacheError, Clock, GameId, Insertion, LeaderboardEntry, LeaderboardStore,
    NewPuzzle, Period, Puzzle, PuzzleId, PuzzleStore, Standing, StoreError, Submission,
    SubmissionStore, SubmissionTotals, Word,
};

/// Clock whose time only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start the clock at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Start the clock at a UTC calendar time.
    ///
    /// # Panics
    /// Panics when the components do not form a valid timestamp.
    #[must_use]
    pub fn at_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        let Some(now) = Utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
        else {
            panic!("invalid timestamp {year}-{month}-{day} {hour}:{min}:{sec}");
        };
        Self::new(now)
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }

    /// Jump to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Cache whose every operation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCache;

impl Cache for FailingCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(unavailable())
    }

    fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(unavailable())
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(unavailable())
    }
}

fn unavailable() -> CacheError {
    CacheError::Unavailable {
        reason: "cache offline".to_owned(),
    }
}

#[derive(Debug, Default)]
struct State {
    next_puzzle_id: i64,
    puzzles: BTreeMap<PuzzleId, Puzzle>,
    words: BTreeMap<(PuzzleId, String), u32>,
    submissions: Vec<Submission>,
    entries: HashMap<(GameId, ActorId, Period), u64>,
}

/// In-memory store implementing every repository trait.
///
/// Uniqueness rules match the `SQLite` store: one puzzle per date, one
/// submission per (puzzle, actor, word) and one leaderboard entry per
/// (game, actor, period).
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a leaderboard entry, bypassing max semantics.
    ///
    /// # Errors
    /// Returns [`StoreError::Poisoned`] when the internal lock is poisoned.
    pub fn set_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: Period,
        score: u64,
    ) -> Result<(), StoreError> {
        self.lock()?
            .entries
            .insert((game.clone(), actor.clone(), period), score);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl PuzzleStore for MemoryStore {
    fn find_puzzle(&self, id: PuzzleId) -> Result<Option<Puzzle>, StoreError> {
        Ok(self.lock()?.puzzles.get(&id).cloned())
    }

    fn find_puzzle_by_date(&self, date: NaiveDate) -> Result<Option<Puzzle>, StoreError> {
        Ok(self
            .lock()?
            .puzzles
            .values()
            .find(|puzzle| puzzle.date == date)
            .cloned())
    }

    fn create_puzzle(&self, puzzle: &NewPuzzle) -> Result<Insertion<Puzzle>, StoreError> {
        let mut state = self.lock()?;
        if state.puzzles.values().any(|stored| stored.date == puzzle.date) {
            return Ok(Insertion::Conflict);
        }
        state.next_puzzle_id += 1;
        let id = PuzzleId(state.next_puzzle_id);
        let words = distinct_words(puzzle);
        let created = Puzzle {
            id,
            letters: puzzle.letters.clone(),
            date: puzzle.date,
            possible_word_count: u32::try_from(words.len()).unwrap_or(u32::MAX),
        };
        for word in words {
            state.words.insert((id, word.text), word.score);
        }
        state.puzzles.insert(id, created.clone());
        Ok(Insertion::Inserted(created))
    }

    fn find_word(&self, puzzle_id: PuzzleId, text: &str) -> Result<Option<Word>, StoreError> {
        let text = text.to_lowercase();
        Ok(self
            .lock()?
            .words
            .get(&(puzzle_id, text.clone()))
            .map(|&score| Word {
                puzzle_id,
                text,
                score,
            }))
    }

    fn words_for_puzzle(&self, puzzle_id: PuzzleId) -> Result<Vec<Word>, StoreError> {
        Ok(self
            .lock()?
            .words
            .iter()
            .filter(|((id, _), _)| *id == puzzle_id)
            .map(|((_, text), &score)| Word {
                puzzle_id,
                text: text.clone(),
                score,
            })
            .collect())
    }
}

impl SubmissionStore for MemoryStore {
    fn insert_submission(
        &self,
        submission: &Submission,
    ) -> Result<Insertion<Submission>, StoreError> {
        let mut state = self.lock()?;
        let text = submission.text.to_lowercase();
        if !state
            .words
            .contains_key(&(submission.puzzle_id, text.clone()))
        {
            return Err(StoreError::Unavailable {
                reason: format!("{text} is not a word of puzzle {}", submission.puzzle_id),
            });
        }
        let duplicate = state.submissions.iter().any(|stored| {
            stored.puzzle_id == submission.puzzle_id
                && stored.actor == submission.actor
                && stored.text == text
        });
        if duplicate {
            return Ok(Insertion::Conflict);
        }
        let stored = Submission {
            text,
            ..submission.clone()
        };
        state.submissions.push(stored.clone());
        Ok(Insertion::Inserted(stored))
    }

    fn submission_totals(
        &self,
        puzzle_id: PuzzleId,
        actor: &ActorId,
    ) -> Result<SubmissionTotals, StoreError> {
        let state = self.lock()?;
        Ok(state
            .submissions
            .iter()
            .filter(|stored| stored.puzzle_id == puzzle_id && &stored.actor == actor)
            .fold(SubmissionTotals::default(), |totals, stored| {
                SubmissionTotals {
                    score: totals.score + u64::from(stored.score),
                    words_found: totals.words_found + 1,
                }
            }))
    }
}

impl LeaderboardStore for MemoryStore {
    fn raise_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
        score: u64,
    ) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        let stored = state
            .entries
            .entry((game.clone(), actor.clone(), *period))
            .or_insert(score);
        *stored = (*stored).max(score);
        Ok(*stored)
    }

    fn top_scores(
        &self,
        game: &GameId,
        period: &Period,
        limit: usize,
    ) -> Result<Vec<Standing>, StoreError> {
        let state = self.lock()?;
        let mut standings: Vec<Standing> = state
            .entries
            .iter()
            .filter(|((g, _, p), _)| g == game && p == period)
            .map(|((_, actor, _), &score)| Standing {
                actor: actor.clone(),
                score,
            })
            .collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.actor.cmp(&b.actor)));
        standings.truncate(limit);
        Ok(standings)
    }

    fn find_entry(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
    ) -> Result<Option<LeaderboardEntry>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .entries
            .get(&(game.clone(), actor.clone(), *period))
            .map(|&score| LeaderboardEntry {
                game: game.clone(),
                actor: actor.clone(),
                period: *period,
                score,
            }))
    }

    fn count_higher(
        &self,
        game: &GameId,
        period: &Period,
        score: u64,
    ) -> Result<u64, StoreError> {
        let state = self.lock()?;
        let count = state
            .entries
            .iter()
            .filter(|((g, _, p), stored)| g == game && p == period && **stored > score)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
