//! Letter multisets and the anagram containment check.
//!
//! A puzzle is a multiset of letters; a word is formable from it when the
//! word's own letter histogram fits inside the puzzle's histogram. Only the
//! ASCII letters `a..=z` take part. Letters are compared case-insensitively.

use crate::scoring::MIN_WORD_LENGTH;

const ALPHABET_LEN: usize = 26;

/// Frequency histogram over the letters `a..=z`.
///
/// # Examples
/// ```
/// use letterbox_core::LetterCounts;
///
/// let letters = LetterCounts::from_letters("aab");
/// assert_eq!(letters.get('a'), 2);
/// assert_eq!(letters.get('B'), 1);
/// assert_eq!(letters.total(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LetterCounts {
    counts: [u32; ALPHABET_LEN],
}

impl LetterCounts {
    /// Build a histogram from puzzle letters, ignoring anything that is not
    /// an ASCII letter.
    #[must_use]
    pub fn from_letters(letters: &str) -> Self {
        let mut histogram = Self::default();
        for slot in letters.chars().filter_map(letter_index) {
            histogram.bump(slot);
        }
        histogram
    }

    /// Build a histogram from a candidate word.
    ///
    /// Returns `None` when the word contains a character outside `a..=z`
    /// (after lowercasing), because such a word can never be formed from
    /// puzzle letters.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        let mut histogram = Self::default();
        for ch in word.chars() {
            histogram.bump(letter_index(ch)?);
        }
        Some(histogram)
    }

    /// Return how many times `letter` occurs.
    #[must_use]
    pub fn get(&self, letter: char) -> u32 {
        letter_index(letter)
            .and_then(|slot| self.counts.get(slot))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of letters counted.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Report whether every letter of `other` is available here with at
    /// least the same multiplicity.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(available, needed)| needed <= available)
    }

    fn bump(&mut self, slot: usize) {
        if let Some(count) = self.counts.get_mut(slot) {
            *count = count.saturating_add(1);
        }
    }
}

fn letter_index(ch: char) -> Option<usize> {
    let byte = u8::try_from(ch.to_ascii_lowercase()).ok()?;
    byte.is_ascii_lowercase().then(|| usize::from(byte - b'a'))
}

/// Trim and lowercase a word the way every lookup key expects it.
///
/// # Examples
/// ```
/// use letterbox_core::normalise_word;
///
/// assert_eq!(normalise_word("  Rats\n"), "rats");
/// ```
#[must_use]
pub fn normalise_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Report whether `word` can be spelt from `letters`.
///
/// Each letter of `letters` may be used once per occurrence. Words shorter
/// than three letters are never formable.
///
/// # Examples
/// ```
/// use letterbox_core::can_form_word;
///
/// assert!(can_form_word("aab", "aba"));
/// assert!(!can_form_word("ab", "aba"));
/// assert!(can_form_word("ARTESNI", "rats"));
/// ```
#[must_use]
pub fn can_form_word(letters: &str, word: &str) -> bool {
    if word.chars().count() < MIN_WORD_LENGTH {
        return false;
    }
    LetterCounts::from_word(word)
        .is_some_and(|needed| LetterCounts::from_letters(letters).contains(&needed))
}

/// Order-independent signature of a letter multiset.
///
/// Permutations of the same letters share a signature, which makes it a
/// suitable cache key for anagram enumeration.
///
/// # Examples
/// ```
/// use letterbox_core::letter_signature;
///
/// assert_eq!(letter_signature("Tears"), letter_signature("rates"));
/// assert_eq!(letter_signature("tears"), "aerst");
/// ```
#[must_use]
pub fn letter_signature(letters: &str) -> String {
    let mut chars: Vec<char> = letters
        .chars()
        .map(|ch| ch.to_ascii_lowercase())
        .filter(char::is_ascii_lowercase)
        .collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}
