//! Core domain types for the Letterbox anagram engine.
//!
//! The crate defines the data model shared by puzzle generation, word
//! submission and leaderboard aggregation, together with the capabilities
//! those components consume: repository traits over a relational store, a
//! key-value [`Cache`] and a [`Clock`]. Constructors return `Result` to
//! surface invalid input early.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cache;
pub mod clock;
pub mod letters;
pub mod model;
pub mod period;
pub mod scoring;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use cache::{Cache, CacheError, MemoryCache};
pub use clock::{Clock, SystemClock};
pub use letters::{LetterCounts, can_form_word, letter_signature, normalise_word};
pub use model::{
    ActorId, GameId, IdentifierError, LeaderboardEntry, NewPuzzle, Puzzle, PuzzleId, Rank,
    ScoredWord, Standing, Submission, SubmissionTotals, Word,
};
pub use period::{Month, Period, PeriodError, PeriodType};
pub use scoring::{LengthScorer, MIN_WORD_LENGTH, WordScorer, score_word};
pub use store::{Insertion, LeaderboardStore, PuzzleStore, StoreError, SubmissionStore};

#[cfg(feature = "store-sqlite")]
pub use store::SqliteStore;
