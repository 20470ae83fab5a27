//! Normalised in-memory word corpus.

use std::collections::BTreeMap;

use letterbox_core::{LetterCounts, MIN_WORD_LENGTH};

/// A normalised set of dictionary words with precomputed letter histograms.
///
/// Words are lowercase ASCII, at least three letters long and unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCorpus {
    words: BTreeMap<String, LetterCounts>,
}

impl WordCorpus {
    /// Build a corpus from raw word-list entries.
    ///
    /// Entries are trimmed and lowercased. Blank lines, `#` comments,
    /// entries with characters outside `a..=z` and words shorter than
    /// three letters are skipped.
    ///
    /// # Examples
    /// ```
    /// use letterbox_dictionary::WordCorpus;
    ///
    /// let corpus = WordCorpus::from_entries(["Rats", "# comment", "ox", "don't", "star"]);
    /// assert_eq!(corpus.len(), 2);
    /// assert!(corpus.contains("rats"));
    /// ```
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let words = entries
            .into_iter()
            .filter_map(|entry| normalise_entry(entry.as_ref()))
            .collect();
        Self { words }
    }

    /// Report whether `word` is in the corpus. `word` must already be
    /// normalised.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Report whether the corpus holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over the words in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// Every word whose histogram fits inside `letters`, in lexical order.
    pub fn formable_from<'a>(&'a self, letters: &'a LetterCounts) -> impl Iterator<Item = &'a str> {
        let available = letters.total();
        self.words
            .iter()
            .filter(move |(_, counts)| counts.total() <= available && letters.contains(counts))
            .map(|(word, _)| word.as_str())
    }
}

fn normalise_entry(entry: &str) -> Option<(String, LetterCounts)> {
    let trimmed = entry.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let word = trimmed.to_lowercase();
    if word.chars().count() < MIN_WORD_LENGTH {
        return None;
    }
    let counts = LetterCounts::from_word(&word)?;
    Some((word, counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Star ", Some("star"))]
    #[case("ox", None)]
    #[case("#rats", None)]
    #[case("", None)]
    #[case("don't", None)]
    #[case("café", None)]
    fn normalises_entries(#[case] entry: &str, #[case] expected: Option<&str>) {
        let word = normalise_entry(entry).map(|(word, _)| word);
        assert_eq!(word.as_deref(), expected);
    }

    #[rstest]
    fn duplicate_entries_collapse() {
        let corpus = WordCorpus::from_entries(["rats", "RATS", " rats"]);
        assert_eq!(corpus.len(), 1);
    }

    #[rstest]
    fn formable_words_respect_multiplicity() {
        let corpus = WordCorpus::from_entries(["aba", "abba", "bab", "cab"]);
        let letters = LetterCounts::from_letters("aabc");
        let formable: Vec<_> = corpus.formable_from(&letters).collect();
        assert_eq!(formable, ["aba", "cab"]);
    }
}
