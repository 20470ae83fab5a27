//! Error types raised while loading or querying the word corpus.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised by word sources and the dictionary.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// Reading a word list file failed.
    #[error("failed to read word list at {path}")]
    ReadWordList {
        /// Requested word list path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// A source produced no usable words after normalisation.
    #[error("word source {source_name} contains no usable words")]
    EmptyCorpus {
        /// Description of the offending source.
        source_name: String,
    },
    /// The corpus lock was poisoned by a panicking loader.
    #[error("word corpus lock poisoned")]
    Poisoned,
}
