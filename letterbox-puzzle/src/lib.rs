//! Daily puzzle generation for the Letterbox anagram engine.
//!
//! [`PuzzleGenerator`] builds one puzzle per date: it draws letter sets with
//! [`LetterSetGenerator`], asks a [`Lexicon`](letterbox_dictionary::Lexicon)
//! for every formable word, scores the words and persists the puzzle with
//! its full solution list in one transaction. [`PuzzleCache`] remembers the
//! identifier of each date's puzzle so lookups skip the date index.

#![forbid(unsafe_code)]

mod cache;
mod config;
mod error;
mod generator;
mod letter_set;

pub use cache::{PuzzleCache, date_key};
pub use config::PuzzleGeneratorConfig;
pub use error::{LetterSetError, PuzzleError};
pub use generator::PuzzleGenerator;
pub use letter_set::{
    DEFAULT_LETTER_COUNT, LetterSetGenerator, MAX_LETTERS, MAX_OCCURRENCES, MIN_LETTERS,
};

#[cfg(test)]
mod tests;
