//! Random letter sets biased towards solvable puzzles.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use crate::LetterSetError;

/// Fewest letters a puzzle may have.
pub const MIN_LETTERS: usize = 3;

/// Most letters a puzzle may have.
pub const MAX_LETTERS: usize = 20;

/// Letters in a standard daily puzzle.
pub const DEFAULT_LETTER_COUNT: usize = 7;

/// Times any one letter may appear in a set.
pub const MAX_OCCURRENCES: usize = 2;

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// English consonant frequencies in hundredths of a percent.
const CONSONANT_WEIGHTS: [(char, u32); 21] = [
    ('b', 149),
    ('c', 278),
    ('d', 425),
    ('f', 223),
    ('g', 202),
    ('h', 609),
    ('j', 15),
    ('k', 77),
    ('l', 403),
    ('m', 241),
    ('n', 675),
    ('p', 193),
    ('q', 10),
    ('r', 599),
    ('s', 633),
    ('t', 906),
    ('v', 98),
    ('w', 236),
    ('x', 15),
    ('y', 197),
    ('z', 7),
];

/// Draws puzzle letter sets.
///
/// Each set holds two or three distinct vowels; the remaining slots are
/// consonants drawn in proportion to English letter frequency, with no
/// letter appearing more than [`MAX_OCCURRENCES`] times. The final order is
/// shuffled.
///
/// # Examples
/// ```
/// use letterbox_puzzle::LetterSetGenerator;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let letters = LetterSetGenerator.generate(&mut rng, 7)?;
/// assert_eq!(letters.len(), 7);
/// # Ok::<(), letterbox_puzzle::LetterSetError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct LetterSetGenerator;

impl LetterSetGenerator {
    /// Draw a shuffled set of `length` lowercase letters.
    ///
    /// # Errors
    /// Returns [`LetterSetError::InvalidLength`] when `length` is outside
    /// `MIN_LETTERS..=MAX_LETTERS`.
    pub fn generate<R>(self, rng: &mut R, length: usize) -> Result<String, LetterSetError>
    where
        R: Rng + ?Sized,
    {
        if !(MIN_LETTERS..=MAX_LETTERS).contains(&length) {
            return Err(LetterSetError::InvalidLength { length });
        }

        let vowel_count = rng.gen_range(2..=3_usize).min(length);
        let mut letters: Vec<char> = VOWELS
            .choose_multiple(rng, vowel_count)
            .copied()
            .collect();

        let mut weights: Vec<u32> = CONSONANT_WEIGHTS.iter().map(|&(_, weight)| weight).collect();
        let mut drawn = [0_usize; CONSONANT_WEIGHTS.len()];
        while letters.len() < length {
            let index = WeightedIndex::new(&weights)
                .map_err(|_| LetterSetError::ConsonantsExhausted {
                    drawn: letters.len(),
                })?
                .sample(rng);
            let (Some(&(letter, _)), Some(count), Some(weight)) = (
                CONSONANT_WEIGHTS.get(index),
                drawn.get_mut(index),
                weights.get_mut(index),
            ) else {
                return Err(LetterSetError::ConsonantsExhausted {
                    drawn: letters.len(),
                });
            };
            letters.push(letter);
            *count += 1;
            if *count >= MAX_OCCURRENCES {
                *weight = 0;
            }
        }

        letters.shuffle(rng);
        Ok(letters.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    fn occurrences(letters: &str, letter: char) -> usize {
        letters.chars().filter(|&ch| ch == letter).count()
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(21)]
    fn rejects_unsupported_lengths(#[case] length: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            LetterSetGenerator.generate(&mut rng, length),
            Err(LetterSetError::InvalidLength { length })
        );
    }

    #[rstest]
    fn same_seed_draws_same_letters() {
        let mut first = ChaCha8Rng::seed_from_u64(99);
        let mut second = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(
            LetterSetGenerator.generate(&mut first, 7),
            LetterSetGenerator.generate(&mut second, 7)
        );
    }

    #[rstest]
    fn longest_sets_respect_the_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let letters = LetterSetGenerator
                .generate(&mut rng, MAX_LETTERS)
                .expect("draw letters");
            assert!(
                letters
                    .chars()
                    .all(|letter| occurrences(&letters, letter) <= MAX_OCCURRENCES)
            );
        }
    }

    proptest! {
        #[test]
        fn letter_sets_follow_the_rules(seed in any::<u64>(), length in MIN_LETTERS..=MAX_LETTERS) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let letters = LetterSetGenerator.generate(&mut rng, length).expect("draw letters");

            prop_assert_eq!(letters.chars().count(), length);
            prop_assert!(letters.chars().all(|ch| ch.is_ascii_lowercase()));
            let vowels = letters.chars().filter(|ch| VOWELS.contains(ch)).count();
            prop_assert!((2..=3).contains(&vowels));
            for letter in letters.chars() {
                prop_assert!(occurrences(&letters, letter) <= MAX_OCCURRENCES);
            }
        }
    }
}
