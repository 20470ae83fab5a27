//! Date-to-identifier cache for puzzles.
//!
//! Only the identifier is cached. Callers always reread the puzzle itself
//! from the store, so cached entries never serve stale content.

use std::time::Duration;

use chrono::NaiveDate;
use letterbox_core::cache::{evict, read_json, write_json};
use letterbox_core::{Cache, PuzzleId};

/// Cache key for the puzzle identifier of `date`.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    format!("puzzle:date:{}", date.format("%Y-%m-%d"))
}

/// Remembers which puzzle belongs to which date.
#[derive(Debug, Clone)]
pub struct PuzzleCache<C> {
    cache: C,
    ttl: Duration,
}

impl<C: Cache> PuzzleCache<C> {
    /// Wrap `cache`, storing entries for `ttl`.
    pub const fn new(cache: C, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// The cached identifier for `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<PuzzleId> {
        read_json(&self.cache, &date_key(date))
    }

    /// Remember `id` as the puzzle for `date`.
    pub fn put(&self, date: NaiveDate, id: PuzzleId) {
        write_json(&self.cache, &date_key(date), &id, self.ttl);
    }

    /// Forget the entry for `date`.
    pub fn evict(&self, date: NaiveDate) {
        evict(&self.cache, &date_key(date));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterbox_core::MemoryCache;
    use letterbox_core::test_support::FailingCache;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date")
    }

    #[rstest]
    fn keys_use_iso_dates() {
        assert_eq!(date_key(date()), "puzzle:date:2024-03-09");
    }

    #[rstest]
    fn remembers_and_forgets_identifiers() {
        let cache = PuzzleCache::new(MemoryCache::new(), Duration::from_secs(60));
        assert_eq!(cache.get(date()), None);
        cache.put(date(), PuzzleId(7));
        assert_eq!(cache.get(date()), Some(PuzzleId(7)));
        cache.evict(date());
        assert_eq!(cache.get(date()), None);
    }

    #[rstest]
    fn failing_backend_reads_as_empty() {
        let cache = PuzzleCache::new(FailingCache, Duration::from_secs(60));
        cache.put(date(), PuzzleId(7));
        assert_eq!(cache.get(date()), None);
    }
}
