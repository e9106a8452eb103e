//! Time-bounded memoization layered over [`WatershedLookup`].
//!
//! Keyed by normalized address text. Only `Found` and `NotFound` outcomes
//! are stored; rejections and errors always go back to the providers. The
//! lock is never held across an await, so concurrent misses for the same
//! key may both reach the providers.

use crate::error::{LookupError, Result};
use crate::lookup::WatershedLookup;
use crate::result::LookupOutcome;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;
use watershed_geocode::AddressInput;
use watershed_spatial::ContainmentQuery;

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of memoized addresses.
    /// Default: 1024
    pub capacity: usize,

    /// Entry lifetime in seconds; 0 disables caching.
    /// Default: 3600
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl_secs > 0 && self.capacity > 0
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entry {
    stored_at: Instant,
    outcome: LookupOutcome,
}

/// [`WatershedLookup`] with an in-memory TTL cache in front of it.
pub struct CachedLookup<Q> {
    inner: WatershedLookup<Q>,
    entries: Option<Mutex<LruCache<String, Entry>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<Q: ContainmentQuery> CachedLookup<Q> {
    pub fn new(inner: WatershedLookup<Q>, config: &CacheConfig) -> Self {
        let entries = if config.is_enabled() {
            NonZeroUsize::new(config.capacity).map(|cap| Mutex::new(LruCache::new(cap)))
        } else {
            None
        };
        Self {
            inner,
            entries,
            ttl: Duration::from_secs(config.ttl_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &WatershedLookup<Q> {
        &self.inner
    }

    /// Memoized [`WatershedLookup::lookup`].
    pub async fn lookup(&self, address: &str) -> Result<LookupOutcome> {
        let Some(entries) = &self.entries else {
            return self.inner.lookup(address).await;
        };
        let input = AddressInput::parse(address).ok_or(LookupError::EmptyAddress)?;
        let key = input.normalized();

        if let Some(mut outcome) = self.cached(entries, &key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "lookup cache hit");
            // Entries are shared across spellings; echo this caller's input.
            if let LookupOutcome::Found(result) = &mut outcome {
                result.input_address = input.as_str().to_string();
            }
            return Ok(outcome);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let outcome = self.inner.lookup(address).await?;
        if outcome.is_cacheable() {
            entries.lock().put(
                key,
                Entry {
                    stored_at: Instant::now(),
                    outcome: outcome.clone(),
                },
            );
        }
        Ok(outcome)
    }

    fn cached(&self, entries: &Mutex<LruCache<String, Entry>>, key: &str) -> Option<LookupOutcome> {
        let mut entries = entries.lock();
        let fresh = entries.get(key)?.stored_at.elapsed() < self.ttl;
        if fresh {
            entries.get(key).map(|e| e.outcome.clone())
        } else {
            entries.pop(key);
            None
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.as_ref().map(|e| e.lock().len()).unwrap_or(0),
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().clear();
        }
    }
}
