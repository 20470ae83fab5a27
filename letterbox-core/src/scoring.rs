//! Length-based word scoring.
//!
//! Longer words are rarer in a seven-letter puzzle, so the table grows
//! faster than linearly and flattens once a word uses more than seven
//! letters.

/// Shortest word accepted anywhere in the engine.
pub const MIN_WORD_LENGTH: usize = 3;

/// Score a word by its length in characters.
///
/// Words shorter than [`MIN_WORD_LENGTH`] are rejected upstream and score
/// zero here.
///
/// # Examples
/// ```
/// use letterbox_core::score_word;
///
/// assert_eq!(score_word("rat"), 1);
/// assert_eq!(score_word("rats"), 2);
/// assert_eq!(score_word("strainer"), 15);
/// ```
#[must_use]
pub fn score_word(word: &str) -> u32 {
    match word.chars().count() {
        0..=2 => 0,
        3 => 1,
        4 => 2,
        5 => 4,
        6 => 7,
        7 => 10,
        _ => 15,
    }
}

/// Assign a score to a normalised solution word.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so puzzle
/// generation and submission handling can share one scorer.
pub trait WordScorer: Send + Sync {
    /// Return the score for `word`.
    fn score(&self, word: &str) -> u32;
}

/// The standard scorer backed by [`score_word`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LengthScorer;

impl WordScorer for LengthScorer {
    fn score(&self, word: &str) -> u32 {
        score_word(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("at", 0)]
    #[case("rat", 1)]
    #[case("rats", 2)]
    #[case("stare", 4)]
    #[case("strain", 7)]
    #[case("retains", 10)]
    #[case("strainer", 15)]
    #[case("anagrammatically", 15)]
    fn scores_follow_length_table(#[case] word: &str, #[case] expected: u32) {
        assert_eq!(score_word(word), expected);
    }

    #[rstest]
    fn counts_characters_not_bytes() {
        assert_eq!(score_word("café"), 2);
    }

    #[rstest]
    fn length_scorer_delegates_to_table() {
        assert_eq!(LengthScorer.score("retains"), score_word("retains"));
    }
}
