//! Backing word lists for the dictionary.

use camino::{Utf8Path, Utf8PathBuf};

use crate::DictionaryError;

/// A backing word list.
///
/// Sources return raw entries; normalisation happens when the corpus is
/// built.
pub trait WordSource: Send + Sync {
    /// Human-readable description used in logs and errors.
    fn describe(&self) -> String;

    /// Read every raw entry.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when the backing list cannot be read.
    fn read_entries(&self) -> Result<Vec<String>, DictionaryError>;
}

/// A word list file with one entry per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWordSource {
    path: Utf8PathBuf,
}

impl FileWordSource {
    /// Read words from `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl WordSource for FileWordSource {
    fn describe(&self) -> String {
        format!("file {}", self.path)
    }

    fn read_entries(&self) -> Result<Vec<String>, DictionaryError> {
        let contents = letterbox_fs::read_to_string(&self.path).map_err(|source| {
            DictionaryError::ReadWordList {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(contents.lines().map(str::to_owned).collect())
    }
}

/// An in-memory word list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticWordSource {
    entries: Vec<String>,
}

impl StaticWordSource {
    /// Serve the given entries.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl WordSource for StaticWordSource {
    fn describe(&self) -> String {
        format!("static list of {} entries", self.entries.len())
    }

    fn read_entries(&self) -> Result<Vec<String>, DictionaryError> {
        Ok(self.entries.clone())
    }
}

impl<S: WordSource + ?Sized> WordSource for std::sync::Arc<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn read_entries(&self) -> Result<Vec<String>, DictionaryError> {
        (**self).read_entries()
    }
}
