//! Repository traits over the relational store.
//!
//! The engine needs three capabilities from its store: lookups by unique
//! key, insert-if-absent writes whose conflicts are reported rather than
//! raised, and an atomic conditional-max update for leaderboard scores.
//! Each trait groups the operations one component consumes.
//!
//! Word texts are compared case-insensitively: implementations lowercase
//! texts on write and on lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{
    ActorId, GameId, LeaderboardEntry, NewPuzzle, Puzzle, PuzzleId, ScoredWord, Standing,
    Submission, SubmissionTotals, Word,
};
use crate::period::Period;

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteStore;

/// Outcome of an insert-if-absent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion<T> {
    /// The row was written.
    Inserted(T),
    /// A row with the same unique key already exists; nothing was written.
    Conflict,
}

impl<T> Insertion<T> {
    /// Report whether the write conflicted with an existing row.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the `SQLite` database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open SQLite database at {path}")]
    OpenDatabase {
        /// Requested database path.
        path: String,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the database's parent directory failed.
    #[error("failed to create parent directory for {path}")]
    CreateDirectory {
        /// Requested database path.
        path: String,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Preparing or executing a statement failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to {operation}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A numeric value could not be represented in the store or the model.
    #[error("{field} value {value} is outside the supported range")]
    OutOfRange {
        /// Field being converted.
        field: &'static str,
        /// Offending value, rendered as text.
        value: String,
    },
    /// A stored value could not be decoded into the model.
    #[error("stored {field} value {value:?} could not be decoded")]
    Decode {
        /// Field being decoded.
        field: &'static str,
        /// Offending stored value.
        value: String,
    },
    /// An internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
    /// The backend refused the operation.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Backend-specific description.
        reason: String,
    },
}

/// Persistence for puzzles and their solution words.
pub trait PuzzleStore: Send + Sync {
    /// Fetch a puzzle by identifier.
    fn find_puzzle(&self, id: PuzzleId) -> Result<Option<Puzzle>, StoreError>;

    /// Fetch the puzzle for a date.
    fn find_puzzle_by_date(&self, date: NaiveDate) -> Result<Option<Puzzle>, StoreError>;

    /// Persist a puzzle together with every solution word.
    ///
    /// The puzzle row and its words are written atomically. When a puzzle
    /// already exists for the date nothing is written and
    /// [`Insertion::Conflict`] is returned. Duplicate word texts are
    /// collapsed, and `possible_word_count` reflects the distinct words.
    fn create_puzzle(&self, puzzle: &NewPuzzle) -> Result<Insertion<Puzzle>, StoreError>;

    /// Fetch a solution word of a puzzle.
    fn find_word(&self, puzzle_id: PuzzleId, text: &str) -> Result<Option<Word>, StoreError>;

    /// Every solution word of a puzzle, ordered by text.
    fn words_for_puzzle(&self, puzzle_id: PuzzleId) -> Result<Vec<Word>, StoreError>;
}

/// Persistence for words found by actors.
pub trait SubmissionStore: Send + Sync {
    /// Record a submission unless the actor already found the word.
    ///
    /// A duplicate of (puzzle, actor, text) yields [`Insertion::Conflict`],
    /// never an error. Implementations must reject submissions whose text is
    /// not a solution word of the puzzle.
    fn insert_submission(
        &self,
        submission: &Submission,
    ) -> Result<Insertion<Submission>, StoreError>;

    /// Sum of scores and count of words an actor found in a puzzle.
    fn submission_totals(
        &self,
        puzzle_id: PuzzleId,
        actor: &ActorId,
    ) -> Result<SubmissionTotals, StoreError>;
}

/// Persistence for per-period leaderboard entries.
pub trait LeaderboardStore: Send + Sync {
    /// Atomically set the stored score to `max(stored, score)`, creating
    /// the entry when absent, and return the stored value afterwards.
    ///
    /// Implementations must perform this as a single conditional write so
    /// concurrent callers cannot lose updates.
    fn raise_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
        score: u64,
    ) -> Result<u64, StoreError>;

    /// The highest `limit` entries of a period, by descending score and
    /// then ascending actor identifier.
    fn top_scores(
        &self,
        game: &GameId,
        period: &Period,
        limit: usize,
    ) -> Result<Vec<Standing>, StoreError>;

    /// Fetch one actor's entry for a period.
    fn find_entry(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
    ) -> Result<Option<LeaderboardEntry>, StoreError>;

    /// Number of entries in a period whose score is strictly greater than
    /// `score`.
    fn count_higher(&self, game: &GameId, period: &Period, score: u64)
    -> Result<u64, StoreError>;
}

impl<S: PuzzleStore + ?Sized> PuzzleStore for Arc<S> {
    fn find_puzzle(&self, id: PuzzleId) -> Result<Option<Puzzle>, StoreError> {
        (**self).find_puzzle(id)
    }

    fn find_puzzle_by_date(&self, date: NaiveDate) -> Result<Option<Puzzle>, StoreError> {
        (**self).find_puzzle_by_date(date)
    }

    fn create_puzzle(&self, puzzle: &NewPuzzle) -> Result<Insertion<Puzzle>, StoreError> {
        (**self).create_puzzle(puzzle)
    }

    fn find_word(&self, puzzle_id: PuzzleId, text: &str) -> Result<Option<Word>, StoreError> {
        (**self).find_word(puzzle_id, text)
    }

    fn words_for_puzzle(&self, puzzle_id: PuzzleId) -> Result<Vec<Word>, StoreError> {
        (**self).words_for_puzzle(puzzle_id)
    }
}

impl<S: SubmissionStore + ?Sized> SubmissionStore for Arc<S> {
    fn insert_submission(
        &self,
        submission: &Submission,
    ) -> Result<Insertion<Submission>, StoreError> {
        (**self).insert_submission(submission)
    }

    fn submission_totals(
        &self,
        puzzle_id: PuzzleId,
        actor: &ActorId,
    ) -> Result<SubmissionTotals, StoreError> {
        (**self).submission_totals(puzzle_id, actor)
    }
}

impl<S: LeaderboardStore + ?Sized> LeaderboardStore for Arc<S> {
    fn raise_score(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
        score: u64,
    ) -> Result<u64, StoreError> {
        (**self).raise_score(game, actor, period, score)
    }

    fn top_scores(
        &self,
        game: &GameId,
        period: &Period,
        limit: usize,
    ) -> Result<Vec<Standing>, StoreError> {
        (**self).top_scores(game, period, limit)
    }

    fn find_entry(
        &self,
        game: &GameId,
        actor: &ActorId,
        period: &Period,
    ) -> Result<Option<LeaderboardEntry>, StoreError> {
        (**self).find_entry(game, actor, period)
    }

    fn count_higher(
        &self,
        game: &GameId,
        period: &Period,
        score: u64,
    ) -> Result<u64, StoreError> {
        (**self).count_higher(game, period, score)
    }
}

/// Lowercase and deduplicate the words of a new puzzle, keeping the first
/// score seen for each text.
pub(crate) fn distinct_words(puzzle: &NewPuzzle) -> Vec<ScoredWord> {
    let mut distinct: BTreeMap<String, u32> = BTreeMap::new();
    for word in &puzzle.words {
        distinct
            .entry(word.text.to_lowercase())
            .or_insert(word.score);
    }
    distinct
        .into_iter()
        .map(|(text, score)| ScoredWord { text, score })
        .collect()
}
