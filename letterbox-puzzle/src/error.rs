//! Error types raised while generating or looking up puzzles.

use chrono::NaiveDate;
use letterbox_core::StoreError;
use letterbox_dictionary::DictionaryError;
use thiserror::Error;

use crate::letter_set::{MAX_LETTERS, MIN_LETTERS};

/// Errors raised while drawing a letter set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LetterSetError {
    /// The requested length is outside the supported range.
    #[error("letter sets must have between {MIN_LETTERS} and {MAX_LETTERS} letters, got {length}")]
    InvalidLength {
        /// Requested length.
        length: usize,
    },
    /// Every consonant reached its occurrence cap before the set was full.
    #[error("ran out of consonants after drawing {drawn} letters")]
    ConsonantsExhausted {
        /// Letters drawn before the pool emptied.
        drawn: usize,
    },
}

/// Errors raised by [`PuzzleGenerator`](crate::PuzzleGenerator).
#[derive(Debug, Error)]
pub enum PuzzleError {
    /// No puzzle exists for the date.
    #[error("no puzzle exists for {date}")]
    NotFound {
        /// Requested date.
        date: NaiveDate,
    },
    /// A store operation failed.
    #[error("failed to {operation}")]
    Store {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
    /// The dictionary could not enumerate solutions.
    #[error("failed to enumerate puzzle solutions")]
    Dictionary(#[from] DictionaryError),
    /// A letter set could not be drawn.
    #[error("failed to draw puzzle letters")]
    LetterSet(#[from] LetterSetError),
}

impl PuzzleError {
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { operation, source }
    }
}
