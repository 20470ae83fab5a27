//! Facade crate for the Letterbox daily anagram engine.
//!
//! This crate re-exports the domain types and the three engine components:
//! the anagram dictionary, the daily puzzle generator and the leaderboard
//! with word submission. The SQLite store is exposed behind the
//! `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use letterbox_core::{
    ActorId, Cache, CacheError, Clock, GameId, Insertion, LeaderboardStore, LengthScorer,
    MemoryCache, Month, Period, PeriodError, PeriodType, Puzzle, PuzzleId, PuzzleStore, Rank,
    Standing, StoreError, SubmissionStore, SubmissionTotals, SystemClock, WordScorer,
    can_form_word, score_word,
};
pub use letterbox_dictionary::{
    AnagramDictionary, DictionaryConfig, DictionaryError, FileWordSource, Lexicon,
    StaticWordSource, WordSource,
};
pub use letterbox_leaderboard::{
    CacheInvalidationManager, LeaderboardAggregator, LeaderboardConfig, LeaderboardError,
    RejectionReason, SubmissionError, SubmissionOutcome, WordSubmitter,
};
pub use letterbox_puzzle::{PuzzleError, PuzzleGenerator, PuzzleGeneratorConfig};

#[cfg(feature = "store-sqlite")]
pub use letterbox_core::SqliteStore;

#[cfg(feature = "test-support")]
pub use letterbox_core::test_support;
