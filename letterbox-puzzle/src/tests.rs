//! Unit coverage for puzzle generation and lookup.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::NaiveDate;
use letterbox_core::test_support::{ManualClock, MemoryStore};
use letterbox_core::{MemoryCache, PuzzleId, PuzzleStore, can_form_word, score_word};
use letterbox_dictionary::{DictionaryError, Lexicon};
use rstest::{fixture, rstest};

use crate::{PuzzleCache, PuzzleError, PuzzleGenerator, PuzzleGeneratorConfig};

/// Lexicon returning a scripted number of formable words per call.
///
/// Words are prefixes of rotations of the letters, so each one can be
/// spelled from the set.
#[derive(Debug)]
struct ScriptedLexicon {
    counts: Mutex<VecDeque<usize>>,
    fallback: usize,
    calls: AtomicUsize,
}

impl ScriptedLexicon {
    fn new(counts: &[usize], fallback: usize) -> Self {
        Self {
            counts: Mutex::new(counts.iter().copied().collect()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn formable_words(letters: &str) -> BTreeSet<String> {
    let chars: Vec<char> = letters.chars().collect();
    let mut words = BTreeSet::new();
    for start in 0..chars.len() {
        let rotated: Vec<char> = chars
            .iter()
            .cycle()
            .skip(start)
            .take(chars.len())
            .copied()
            .collect();
        for len in 3..=rotated.len() {
            words.insert(rotated.iter().take(len).collect::<String>());
        }
    }
    words
}

impl Lexicon for ScriptedLexicon {
    fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        Ok(word.len() >= 3)
    }

    fn possible_words(&self, letters: &str) -> Result<BTreeSet<String>, DictionaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let count = self
            .counts
            .lock()
            .expect("counts lock")
            .pop_front()
            .unwrap_or(self.fallback);
        Ok(formable_words(letters).into_iter().take(count).collect())
    }
}

type TestGenerator =
    PuzzleGenerator<Arc<MemoryStore>, Arc<ScriptedLexicon>, Arc<MemoryCache>, Arc<ManualClock>>;

struct Harness {
    store: Arc<MemoryStore>,
    lexicon: Arc<ScriptedLexicon>,
    cache: Arc<MemoryCache>,
    generator: TestGenerator,
}

fn harness(lexicon: ScriptedLexicon, config: PuzzleGeneratorConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let lexicon = Arc::new(lexicon);
    let cache = Arc::new(MemoryCache::new());
    let clock = Arc::new(ManualClock::at_ymd_hms(2024, 3, 1, 6, 0, 0));
    let generator = PuzzleGenerator::with_config(
        Arc::clone(&store),
        Arc::clone(&lexicon),
        Arc::clone(&cache),
        clock,
        config,
    );
    Harness {
        store,
        lexicon,
        cache,
        generator,
    }
}

#[fixture]
fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

#[fixture]
fn config() -> PuzzleGeneratorConfig {
    PuzzleGeneratorConfig::default().with_seed(17)
}

#[rstest]
fn ensure_is_idempotent(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let first = h.generator.ensure_puzzle_for_date(date).expect("create");
    let second = h.generator.ensure_puzzle_for_date(date).expect("reuse");

    assert_eq!(first, second);
    assert_eq!(h.lexicon.calls(), 1);
    assert_eq!(first.possible_word_count, 12);
}

#[rstest]
fn solutions_are_scored_and_formable(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let puzzle = h.generator.ensure_puzzle_for_date(date).expect("create");
    let words = h.store.words_for_puzzle(puzzle.id).expect("words");

    assert_eq!(words.len(), 12);
    for word in words {
        assert!(can_form_word(&puzzle.letters, &word.text));
        assert_eq!(word.score, score_word(&word.text));
    }
}

#[rstest]
fn accepts_first_candidate_over_threshold(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[4, 12, 20], 0), config);
    let puzzle = h.generator.ensure_puzzle_for_date(date).expect("create");

    assert_eq!(h.lexicon.calls(), 2);
    assert_eq!(puzzle.possible_word_count, 12);
}

#[rstest]
fn keeps_best_candidate_when_threshold_is_missed(date: NaiveDate) {
    let config = PuzzleGeneratorConfig::default()
        .with_seed(17)
        .with_max_attempts(4);
    let h = harness(ScriptedLexicon::new(&[3, 8, 5, 2, 30], 0), config);
    let puzzle = h.generator.ensure_puzzle_for_date(date).expect("create");

    assert_eq!(h.lexicon.calls(), 4);
    assert_eq!(puzzle.possible_word_count, 8);
}

#[rstest]
fn zero_attempts_still_draws_once(date: NaiveDate) {
    let config = PuzzleGeneratorConfig::default()
        .with_seed(17)
        .with_max_attempts(0);
    let h = harness(ScriptedLexicon::new(&[2], 0), config);
    let puzzle = h.generator.ensure_puzzle_for_date(date).expect("create");

    assert_eq!(h.lexicon.calls(), 1);
    assert_eq!(puzzle.possible_word_count, 2);
}

#[rstest]
fn lookup_never_generates(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let err = h.generator.get_puzzle_for_date(date).expect_err("missing");

    assert!(matches!(err, PuzzleError::NotFound { date: missing } if missing == date));
    assert_eq!(h.lexicon.calls(), 0);
    assert!(h.store.find_puzzle_by_date(date).expect("lookup").is_none());
}

#[rstest]
fn lookup_caches_the_identifier(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let created = h.generator.ensure_puzzle_for_date(date).expect("create");
    let ids = PuzzleCache::new(Arc::clone(&h.cache), config.id_ttl);

    assert_eq!(ids.get(date), Some(created.id));
    assert_eq!(h.generator.get_puzzle_for_date(date).expect("lookup"), created);
}

#[rstest]
fn stale_cached_identifier_is_replaced(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let created = h.generator.ensure_puzzle_for_date(date).expect("create");
    let ids = PuzzleCache::new(Arc::clone(&h.cache), config.id_ttl);
    ids.put(date, PuzzleId(999));

    assert_eq!(h.generator.get_puzzle_for_date(date).expect("lookup"), created);
    assert_eq!(ids.get(date), Some(created.id));
}

#[rstest]
fn seeded_generators_agree_per_date(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let first = harness(ScriptedLexicon::new(&[], 12), config);
    let second = harness(ScriptedLexicon::new(&[], 12), config);

    let a = first.generator.ensure_puzzle_for_date(date).expect("create");
    let b = second.generator.ensure_puzzle_for_date(date).expect("create");
    assert_eq!(a.letters, b.letters);
    assert_eq!(a.letters.len(), 7);
}

#[rstest]
fn todays_puzzle_follows_the_clock(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let puzzle = h.generator.ensure_todays_puzzle().expect("create");
    assert_eq!(puzzle.date, date);
}

#[rstest]
fn invalid_letter_count_is_reported(date: NaiveDate) {
    let config = PuzzleGeneratorConfig::default().with_letter_count(2);
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let err = h.generator.ensure_puzzle_for_date(date).expect_err("invalid");
    assert!(matches!(err, PuzzleError::LetterSet(_)));
}

#[rstest]
fn concurrent_first_access_creates_one_puzzle(date: NaiveDate, config: PuzzleGeneratorConfig) {
    let h = harness(ScriptedLexicon::new(&[], 12), config);
    let generator = &h.generator;

    let ids: Vec<PuzzleId> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || generator.ensure_puzzle_for_date(date)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread").expect("ensure").id)
            .collect()
    });

    assert!(ids.iter().all(|id| *id == ids[0]));
    assert!(h.store.find_puzzle(PuzzleId(2)).expect("lookup").is_none());
}
