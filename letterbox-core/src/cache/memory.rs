//! In-process cache with per-entry expiry, backed by `moka`.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use moka::Expiry;

use super::{Cache, CacheError};
use crate::clock::{Clock, SystemClock};

/// Upper bound on entries held by [`MemoryCache::new`].
pub const DEFAULT_MAX_CAPACITY: u64 = 100_000;

/// Longest lifetime handed to the backing cache.
const LONGEST_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

/// Expires each entry after the `ttl` it was last written with.
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl.min(LONGEST_TTL))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl.min(LONGEST_TTL))
    }
}

/// A bounded in-process [`Cache`].
///
/// Storage, capacity eviction and wall-clock expiry are delegated to
/// [`moka::sync::Cache`]. The injected [`Clock`] is consulted on every read
/// as well, so an entry is never returned once the clock has passed its
/// expiry. Suitable for a single process; hosts running several processes
/// should supply a shared cache instead.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use letterbox_core::{Cache, MemoryCache};
///
/// let cache = MemoryCache::new();
/// cache.put("greeting", "hello", Duration::from_secs(60))?;
/// assert_eq!(cache.get("greeting")?.as_deref(), Some("hello"));
/// cache.delete("greeting")?;
/// assert!(cache.get("greeting")?.is_none());
/// # Ok::<(), letterbox_core::CacheError>(())
/// ```
pub struct MemoryCache<K = SystemClock> {
    entries: moka::sync::Cache<String, Entry>,
    clock: K,
}

impl MemoryCache<SystemClock> {
    /// Create an empty cache driven by the system clock, holding at most
    /// [`DEFAULT_MAX_CAPACITY`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clock> MemoryCache<K> {
    /// Create an empty cache driven by `clock`.
    pub fn with_clock(clock: K) -> Self {
        Self::with_capacity_and_clock(DEFAULT_MAX_CAPACITY, clock)
    }

    /// Create an empty cache holding at most `max_capacity` entries.
    pub fn with_capacity_and_clock(max_capacity: u64, clock: K) -> Self {
        let entries = moka::sync::Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();
        Self { entries, clock }
    }

    /// Number of unexpired entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .count()
    }

    /// Report whether the cache holds no unexpired entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry the clock considers expired and run pending
    /// maintenance, returning how many entries the clock expired.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key)
            .collect();
        for key in &expired {
            self.entries.invalidate(key.as_str());
        }
        self.entries.run_pending_tasks();
        expired.len()
    }

    fn expiry_for(&self, ttl: Duration) -> Option<DateTime<Utc>> {
        let delta = TimeDelta::from_std(ttl).ok()?;
        self.clock.now().checked_add_signed(delta)
    }
}

impl<K> fmt::Debug for MemoryCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.entries.entry_count())
            .finish_non_exhaustive()
    }
}

impl<K: Clock> Cache for MemoryCache<K> {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if entry.is_live(self.clock.now()) {
            Ok(Some(entry.value))
        } else {
            self.entries.invalidate(key);
            Ok(None)
        }
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value: value.to_owned(),
            ttl,
            expires_at: self.expiry_for(ttl),
        };
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key);
        Ok(())
    }
}
