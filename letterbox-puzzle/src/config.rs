//! Tunables for [`PuzzleGenerator`](crate::PuzzleGenerator).

use std::time::Duration;

use crate::letter_set::DEFAULT_LETTER_COUNT;

/// Configuration for [`PuzzleGenerator`](crate::PuzzleGenerator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleGeneratorConfig {
    /// Letters per puzzle.
    pub letter_count: usize,
    /// Letter sets drawn before the best one so far is accepted.
    pub max_attempts: u32,
    /// Solutions a letter set needs to be accepted immediately.
    pub min_possible_words: usize,
    /// Lifetime of cached date-to-identifier entries.
    pub id_ttl: Duration,
    /// Seed making each date's letters reproducible. `None` draws from
    /// entropy.
    pub seed: Option<u64>,
}

impl Default for PuzzleGeneratorConfig {
    fn default() -> Self {
        Self {
            letter_count: DEFAULT_LETTER_COUNT,
            max_attempts: 10,
            min_possible_words: 10,
            id_ttl: Duration::from_secs(24 * 60 * 60),
            seed: None,
        }
    }
}

impl PuzzleGeneratorConfig {
    /// Override the number of letters per puzzle.
    #[must_use]
    pub const fn with_letter_count(mut self, letter_count: usize) -> Self {
        self.letter_count = letter_count;
        self
    }

    /// Override the attempt bound.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Override the solution threshold.
    #[must_use]
    pub const fn with_min_possible_words(mut self, min_possible_words: usize) -> Self {
        self.min_possible_words = min_possible_words;
        self
    }

    /// Override the identifier cache lifetime.
    #[must_use]
    pub const fn with_id_ttl(mut self, id_ttl: Duration) -> Self {
        self.id_ttl = id_ttl;
        self
    }

    /// Seed letter generation.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
