//! Key-value cache capability.
//!
//! The engine only needs three primitives from a cache: `get`, `put` with a
//! time-to-live and `delete` by exact key. There is no pattern or tag
//! deletion; callers that must invalidate several keys enumerate them.
//!
//! The cache is an optimisation, never a source of truth. The typed helpers
//! in this module swallow cache failures after logging them so a cache
//! outage degrades to direct store reads.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

mod memory;

pub use memory::{DEFAULT_MAX_CAPACITY, MemoryCache};

/// Errors reported by cache backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend could not be reached or refused the operation.
    #[error("cache unavailable: {reason}")]
    Unavailable {
        /// Backend-specific description.
        reason: String,
    },
}

/// A string-keyed cache with per-entry expiry.
///
/// Implementations must be thread-safe (`Send` + `Sync`). Expired entries
/// must never be returned by [`Cache::get`].
pub trait Cache: Send + Sync {
    /// Fetch the value stored under `key`, if present and unexpired.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`, replacing any existing value.
    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

impl<C: Cache + ?Sized> Cache for Arc<C> {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        (**self).put(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }
}

/// Read and decode a JSON value, treating any failure as a miss.
#[cfg(feature = "serde")]
pub fn read_json<C, T>(cache: &C, key: &str) -> Option<T>
where
    C: Cache + ?Sized,
    T: serde::de::DeserializeOwned,
{
    match cache.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => {
                log::debug!("cache hit for {key}");
                Some(value)
            }
            Err(err) => {
                log::warn!("discarding undecodable cache entry {key}: {err}");
                None
            }
        },
        Ok(None) => {
            log::debug!("cache miss for {key}");
            None
        }
        Err(err) => {
            log::warn!("cache read for {key} failed; falling back to the store: {err}");
            None
        }
    }
}

/// Encode `value` as JSON and store it, logging rather than returning
/// failures.
#[cfg(feature = "serde")]
pub fn write_json<C, T>(cache: &C, key: &str, value: &T, ttl: Duration)
where
    C: Cache + ?Sized,
    T: serde::Serialize + ?Sized,
{
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            log::warn!("failed to encode cache entry {key}: {err}");
            return;
        }
    };
    if let Err(err) = cache.put(key, &encoded, ttl) {
        log::warn!("cache write for {key} failed: {err}");
    }
}

/// Delete `key`, logging failures. Returns whether the delete succeeded.
pub fn evict<C: Cache + ?Sized>(cache: &C, key: &str) -> bool {
    match cache.delete(key) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("cache delete for {key} failed: {err}");
            false
        }
    }
}
