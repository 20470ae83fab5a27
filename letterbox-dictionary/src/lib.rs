//! Dictionary services for the Letterbox anagram engine.
//!
//! An [`AnagramDictionary`] answers two questions against a word corpus:
//! whether a word exists, and which words can be spelled from a letter set.
//! The corpus is read from a [`WordSource`] such as a word list file and
//! held in memory; query results are cached through the core
//! [`Cache`](letterbox_core::Cache) capability.
//!
//! # Examples
//!
//! ```no_run
//! use letterbox_core::{LengthScorer, MemoryCache};
//! use letterbox_dictionary::{AnagramDictionary, FileWordSource};
//!
//! let dictionary = AnagramDictionary::new(
//!     FileWordSource::new("/usr/share/dict/words"),
//!     MemoryCache::new(),
//! );
//! let solutions = dictionary.scored_possible_words("artesni", &LengthScorer)?;
//! println!("{} solutions", solutions.len());
//! # Ok::<(), letterbox_dictionary::DictionaryError>(())
//! ```

#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

mod corpus;
mod dictionary;
mod error;
mod keys;
mod source;

pub use corpus::WordCorpus;
pub use dictionary::{AnagramDictionary, DictionaryConfig};
pub use error::DictionaryError;
pub use source::{FileWordSource, StaticWordSource, WordSource};

/// Word lookups consumed by puzzle generation.
///
/// Implemented by [`AnagramDictionary`]; tests may substitute a fixed
/// lexicon.
pub trait Lexicon: Send + Sync {
    /// Report whether `word` is a dictionary word.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when the word list cannot be read.
    fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError>;

    /// Every dictionary word formable from `letters`.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when the word list cannot be read.
    fn possible_words(&self, letters: &str) -> Result<BTreeSet<String>, DictionaryError>;
}

impl<L: Lexicon + ?Sized> Lexicon for Arc<L> {
    fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        (**self).is_valid_word(word)
    }

    fn possible_words(&self, letters: &str) -> Result<BTreeSet<String>, DictionaryError> {
        (**self).possible_words(letters)
    }
}
