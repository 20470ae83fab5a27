//! Word validation and anagram enumeration over a cached corpus.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use letterbox_core::cache::{read_json, write_json};
use letterbox_core::{
    Cache, Clock, LetterCounts, MIN_WORD_LENGTH, ScoredWord, SystemClock, WordScorer,
    letter_signature, normalise_word,
};

use crate::{DictionaryError, Lexicon, WordCorpus, WordSource, keys};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetimes of the corpus and of cached query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryConfig {
    /// How long a loaded corpus is served before it is reloaded.
    pub corpus_ttl: Duration,
    /// Lifetime of cached per-word validity results.
    pub validity_ttl: Duration,
    /// Lifetime of cached possible-word sets.
    pub possible_words_ttl: Duration,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            corpus_ttl: DAY.saturating_mul(7),
            validity_ttl: DAY,
            possible_words_ttl: DAY,
        }
    }
}

impl DictionaryConfig {
    /// Override the corpus lifetime.
    #[must_use]
    pub const fn with_corpus_ttl(mut self, ttl: Duration) -> Self {
        self.corpus_ttl = ttl;
        self
    }

    /// Override the validity cache lifetime.
    #[must_use]
    pub const fn with_validity_ttl(mut self, ttl: Duration) -> Self {
        self.validity_ttl = ttl;
        self
    }

    /// Override the possible-words cache lifetime.
    #[must_use]
    pub const fn with_possible_words_ttl(mut self, ttl: Duration) -> Self {
        self.possible_words_ttl = ttl;
        self
    }
}

#[derive(Debug)]
struct LoadedCorpus {
    words: Arc<WordCorpus>,
    loaded_at: DateTime<Utc>,
}

/// Validates words and enumerates the corpus words formable from a letter
/// set.
///
/// The corpus is loaded lazily from its [`WordSource`] on first use and
/// reloaded once older than [`DictionaryConfig::corpus_ttl`]. Query results
/// are cached in the injected [`Cache`]; cache failures fall back to direct
/// computation.
///
/// # Examples
/// ```
/// use letterbox_core::MemoryCache;
/// use letterbox_dictionary::{AnagramDictionary, StaticWordSource};
///
/// let source = StaticWordSource::new(["rats", "star", "tsar", "arts", "zebra"]);
/// let dictionary = AnagramDictionary::new(source, MemoryCache::new());
///
/// assert!(dictionary.is_valid_word("STAR")?);
/// let words = dictionary.possible_words("artesni")?;
/// assert_eq!(words.len(), 4);
/// # Ok::<(), letterbox_dictionary::DictionaryError>(())
/// ```
#[derive(Debug)]
pub struct AnagramDictionary<S, C, K = SystemClock> {
    source: S,
    cache: C,
    clock: K,
    config: DictionaryConfig,
    corpus: RwLock<Option<LoadedCorpus>>,
}

impl<S: WordSource, C: Cache> AnagramDictionary<S, C, SystemClock> {
    /// Create a dictionary driven by the system clock.
    pub fn new(source: S, cache: C) -> Self {
        Self::with_clock(source, cache, SystemClock)
    }
}

impl<S: WordSource, C: Cache, K: Clock> AnagramDictionary<S, C, K> {
    /// Create a dictionary driven by `clock`.
    pub fn with_clock(source: S, cache: C, clock: K) -> Self {
        Self {
            source,
            cache,
            clock,
            config: DictionaryConfig::default(),
            corpus: RwLock::new(None),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: DictionaryConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// The current corpus, loading or reloading it when needed.
    ///
    /// When a reload fails but an earlier corpus exists, the earlier corpus
    /// keeps being served and the reload is retried after another TTL.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when no corpus has been loaded yet and
    /// the source cannot produce one.
    pub fn corpus(&self) -> Result<Arc<WordCorpus>, DictionaryError> {
        let now = self.clock.now();
        {
            let guard = self.corpus.read().map_err(|_| DictionaryError::Poisoned)?;
            if let Some(current) = guard.as_ref().filter(|loaded| self.is_fresh(loaded, now)) {
                return Ok(Arc::clone(&current.words));
            }
        }

        let mut guard = self.corpus.write().map_err(|_| DictionaryError::Poisoned)?;
        if let Some(current) = guard.as_ref().filter(|loaded| self.is_fresh(loaded, now)) {
            return Ok(Arc::clone(&current.words));
        }
        match self.load() {
            Ok(loaded) => {
                let words = Arc::new(loaded);
                *guard = Some(LoadedCorpus {
                    words: Arc::clone(&words),
                    loaded_at: now,
                });
                Ok(words)
            }
            Err(err) => match guard.as_mut() {
                Some(previous) => {
                    log::warn!(
                        "reloading word corpus from {} failed; serving previous corpus: {err}",
                        self.source.describe()
                    );
                    previous.loaded_at = now;
                    Ok(Arc::clone(&previous.words))
                }
                None => Err(err),
            },
        }
    }

    /// Discard the loaded corpus and read the source again.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when the source cannot produce a corpus;
    /// the previous corpus is kept in that case.
    pub fn reload(&self) -> Result<Arc<WordCorpus>, DictionaryError> {
        let loaded = Arc::new(self.load()?);
        let mut guard = self.corpus.write().map_err(|_| DictionaryError::Poisoned)?;
        *guard = Some(LoadedCorpus {
            words: Arc::clone(&loaded),
            loaded_at: self.clock.now(),
        });
        Ok(loaded)
    }

    /// Report whether `word` is a dictionary word.
    ///
    /// The word is normalised first; words shorter than three letters are
    /// never valid.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when the corpus cannot be loaded.
    pub fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        let normalised = normalise_word(word);
        if normalised.chars().count() < MIN_WORD_LENGTH {
            return Ok(false);
        }
        let key = keys::valid_word(&normalised);
        if let Some(valid) = read_json::<_, bool>(&self.cache, &key) {
            return Ok(valid);
        }
        let valid = self.corpus()?.contains(&normalised);
        write_json(&self.cache, &key, &valid, self.config.validity_ttl);
        Ok(valid)
    }

    /// Report whether `word` can be spelled from `letters`.
    #[must_use]
    pub fn can_form_word(&self, letters: &str, word: &str) -> bool {
        letterbox_core::can_form_word(letters, word)
    }

    /// Every corpus word formable from `letters`.
    ///
    /// Results are cached under the sorted letter signature, so any
    /// permutation of the same multiset shares one entry.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when the corpus cannot be loaded.
    pub fn possible_words(&self, letters: &str) -> Result<BTreeSet<String>, DictionaryError> {
        let signature = letter_signature(letters);
        if signature.len() < MIN_WORD_LENGTH {
            return Ok(BTreeSet::new());
        }
        let key = keys::possible_words(&signature);
        if let Some(words) = read_json::<_, BTreeSet<String>>(&self.cache, &key) {
            return Ok(words);
        }
        let counts = LetterCounts::from_letters(&signature);
        let words: BTreeSet<String> = self
            .corpus()?
            .formable_from(&counts)
            .map(str::to_owned)
            .collect();
        write_json(&self.cache, &key, &words, self.config.possible_words_ttl);
        Ok(words)
    }

    /// Every corpus word formable from `letters`, scored by `scorer`.
    ///
    /// # Errors
    /// Returns [`DictionaryError`] when the corpus cannot be loaded.
    pub fn scored_possible_words<W>(
        &self,
        letters: &str,
        scorer: &W,
    ) -> Result<Vec<ScoredWord>, DictionaryError>
    where
        W: WordScorer + ?Sized,
    {
        Ok(self
            .possible_words(letters)?
            .into_iter()
            .map(|text| {
                let score = scorer.score(&text);
                ScoredWord { text, score }
            })
            .collect())
    }

    fn is_fresh(&self, loaded: &LoadedCorpus, now: DateTime<Utc>) -> bool {
        let ttl = TimeDelta::from_std(self.config.corpus_ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(loaded.loaded_at) < ttl
    }

    fn load(&self) -> Result<WordCorpus, DictionaryError> {
        let description = self.source.describe();
        let loaded = WordCorpus::from_entries(self.source.read_entries()?);
        if loaded.is_empty() {
            return Err(DictionaryError::EmptyCorpus {
                source_name: description,
            });
        }
        log::info!("loaded {} words from {description}", loaded.len());
        Ok(loaded)
    }
}

impl<S: WordSource, C: Cache, K: Clock> Lexicon for AnagramDictionary<S, C, K> {
    fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        Self::is_valid_word(self, word)
    }

    fn possible_words(&self, letters: &str) -> Result<BTreeSet<String>, DictionaryError> {
        Self::possible_words(self, letters)
    }
}
