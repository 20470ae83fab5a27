//! Idempotent daily puzzle creation.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use letterbox_core::{
    Cache, Clock, Insertion, LengthScorer, NewPuzzle, Puzzle, PuzzleStore, ScoredWord,
    SystemClock, WordScorer,
};
use letterbox_dictionary::Lexicon;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{LetterSetGenerator, PuzzleCache, PuzzleError, PuzzleGeneratorConfig};

/// Multiplier spreading configured seeds before the day number is mixed in.
const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug)]
struct Candidate {
    letters: String,
    words: BTreeSet<String>,
}

/// Creates and looks up the puzzle for each date.
///
/// At most one puzzle exists per date. [`PuzzleGenerator::ensure_puzzle_for_date`]
/// returns the stored puzzle when there is one and otherwise draws letters,
/// enumerates their solutions and persists both atomically. Racing callers
/// are reconciled by the store's unique constraint on the date: the loser
/// rereads and returns the winner's puzzle.
pub struct PuzzleGenerator<S, D, C, K = SystemClock> {
    store: S,
    dictionary: D,
    cache: PuzzleCache<C>,
    clock: K,
    scorer: Box<dyn WordScorer>,
    config: PuzzleGeneratorConfig,
}

impl<S, D, C> PuzzleGenerator<S, D, C, SystemClock>
where
    S: PuzzleStore,
    D: Lexicon,
    C: Cache,
{
    /// Construct a generator using default configuration.
    pub fn new(store: S, dictionary: D, cache: C) -> Self {
        Self::with_config(
            store,
            dictionary,
            cache,
            SystemClock,
            PuzzleGeneratorConfig::default(),
        )
    }
}

impl<S, D, C, K> PuzzleGenerator<S, D, C, K>
where
    S: PuzzleStore,
    D: Lexicon,
    C: Cache,
    K: Clock,
{
    /// Construct a generator with explicit clock and configuration.
    pub fn with_config(
        store: S,
        dictionary: D,
        cache: C,
        clock: K,
        config: PuzzleGeneratorConfig,
    ) -> Self {
        Self {
            store,
            dictionary,
            cache: PuzzleCache::new(cache, config.id_ttl),
            clock,
            scorer: Box::new(LengthScorer),
            config,
        }
    }

    /// Replace the word scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: impl WordScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PuzzleGeneratorConfig {
        &self.config
    }

    /// Return the puzzle for `date`, creating it when none exists.
    ///
    /// An existing puzzle is never regenerated. When no letter set reaches
    /// the solution threshold within the attempt bound, the candidate with
    /// the most solutions is accepted.
    ///
    /// # Errors
    /// Returns [`PuzzleError`] when the store or dictionary fails.
    pub fn ensure_puzzle_for_date(&self, date: NaiveDate) -> Result<Puzzle, PuzzleError> {
        if let Some(existing) = self.lookup(date)? {
            return Ok(existing);
        }

        let candidate = self.choose_letters(date)?;
        let words: Vec<ScoredWord> = candidate
            .words
            .into_iter()
            .map(|text| {
                let score = self.scorer.score(&text);
                ScoredWord { text, score }
            })
            .collect();
        let new_puzzle = NewPuzzle {
            letters: candidate.letters,
            date,
            words,
        };

        match self
            .store
            .create_puzzle(&new_puzzle)
            .map_err(PuzzleError::store("persist puzzle"))?
        {
            Insertion::Inserted(created) => {
                log::info!(
                    "created puzzle {} for {date} with letters {} and {} solutions",
                    created.id,
                    created.letters,
                    created.possible_word_count
                );
                self.cache.put(date, created.id);
                Ok(created)
            }
            Insertion::Conflict => {
                log::debug!("puzzle for {date} was created concurrently; rereading");
                let winner = self
                    .store
                    .find_puzzle_by_date(date)
                    .map_err(PuzzleError::store("reread concurrently created puzzle"))?
                    .ok_or(PuzzleError::NotFound { date })?;
                self.cache.put(date, winner.id);
                Ok(winner)
            }
        }
    }

    /// Return the puzzle for today, creating it when none exists.
    ///
    /// # Errors
    /// Returns [`PuzzleError`] when the store or dictionary fails.
    pub fn ensure_todays_puzzle(&self) -> Result<Puzzle, PuzzleError> {
        self.ensure_puzzle_for_date(self.clock.today())
    }

    /// Return the existing puzzle for `date` without generating one.
    ///
    /// # Errors
    /// Returns [`PuzzleError::NotFound`] when no puzzle exists for the date
    /// and [`PuzzleError::Store`] when the lookup fails.
    pub fn get_puzzle_for_date(&self, date: NaiveDate) -> Result<Puzzle, PuzzleError> {
        self.lookup(date)?.ok_or(PuzzleError::NotFound { date })
    }

    fn lookup(&self, date: NaiveDate) -> Result<Option<Puzzle>, PuzzleError> {
        if let Some(id) = self.cache.get(date) {
            let cached = self
                .store
                .find_puzzle(id)
                .map_err(PuzzleError::store("load cached puzzle"))?;
            match cached {
                Some(puzzle) if puzzle.date == date => return Ok(Some(puzzle)),
                _ => {
                    log::debug!("cached puzzle {id} no longer matches {date}; evicting");
                    self.cache.evict(date);
                }
            }
        }

        let stored = self
            .store
            .find_puzzle_by_date(date)
            .map_err(PuzzleError::store("look up puzzle by date"))?;
        if let Some(puzzle) = &stored {
            self.cache.put(date, puzzle.id);
        }
        Ok(stored)
    }

    fn choose_letters(&self, date: NaiveDate) -> Result<Candidate, PuzzleError> {
        let mut rng = self.rng_for(date);
        let threshold = self.config.min_possible_words;
        let mut best = self.draw_candidate(&mut rng)?;
        let mut attempt = 1;
        log::debug!(
            "attempt {attempt} for {date}: {} spells {} words",
            best.letters,
            best.words.len()
        );

        while best.words.len() < threshold && attempt < self.config.max_attempts {
            attempt += 1;
            let next = self.draw_candidate(&mut rng)?;
            log::debug!(
                "attempt {attempt} for {date}: {} spells {} words",
                next.letters,
                next.words.len()
            );
            if next.words.len() > best.words.len() {
                best = next;
            }
        }

        if best.words.len() < threshold {
            log::warn!(
                "no letter set for {date} reached {threshold} solutions in {attempt} attempts; \
                 accepting {} with {}",
                best.letters,
                best.words.len()
            );
        }
        Ok(best)
    }

    fn draw_candidate(&self, rng: &mut ChaCha8Rng) -> Result<Candidate, PuzzleError> {
        let letters = LetterSetGenerator.generate(rng, self.config.letter_count)?;
        let words = self.dictionary.possible_words(&letters)?;
        Ok(Candidate { letters, words })
    }

    fn rng_for(&self, date: NaiveDate) -> ChaCha8Rng {
        self.config.seed.map_or_else(ChaCha8Rng::from_entropy, |seed| {
            let day = u64::from(date.num_days_from_ce().unsigned_abs());
            ChaCha8Rng::seed_from_u64(seed.wrapping_mul(SEED_SPREAD) ^ day)
        })
    }
}
