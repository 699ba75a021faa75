//! Encoding cache for repeated chunks.
//!
//! Natural text repeats the same pre-tokenized chunks ("the", " de", ",")
//! constantly. This LRU cache stores the merge result per chunk so repeated
//! chunks skip the merge loop. It is shared between threads behind a mutex.

use compact_str::CompactString;
use lru::LruCache;
use mergerank_core::Result;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

type ChunkLru = LruCache<CompactString, Vec<u32>, ahash::RandomState>;

/// Thread-safe LRU cache: chunk text -> token IDs.
pub struct EncodingCache {
    /// `None` when the capacity is zero (caching disabled)
    cache: Option<Mutex<ChunkLru>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EncodingCache {
    /// Create a new encoding cache with the given capacity.
    ///
    /// A capacity of zero disables caching.
    pub fn with_capacity(capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity)
            .map(|cap| Mutex::new(LruCache::with_hasher(cap, ahash::RandomState::new())));

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a disabled cache.
    pub fn disabled() -> Self {
        Self::with_capacity(0)
    }

    /// Get cached encoding or compute it with `encoder`.
    ///
    /// Results are only cached when `encoder` succeeds. A poisoned lock
    /// degrades to uncached encoding.
    pub fn get_or_encode<F>(&self, text: &str, encoder: F) -> Result<Vec<u32>>
    where
        F: FnOnce(&str) -> Result<Vec<u32>>,
    {
        let Some(cache) = &self.cache else {
            return encoder(text);
        };

        if let Ok(mut guard) = cache.lock() {
            if let Some(cached) = guard.get(text) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(cached.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let encoded = encoder(text)?;

        if let Ok(mut guard) = cache.lock() {
            guard.put(CompactString::new(text), encoded.clone());
        }

        Ok(encoded)
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        if let Some(Ok(mut guard)) = self.cache.as_ref().map(Mutex::lock) {
            guard.clear();
        }
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        match self.cache.as_ref().map(Mutex::lock) {
            Some(Ok(guard)) => guard.len(),
            _ => 0,
        }
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the cache capacity (zero when disabled).
    pub fn capacity(&self) -> usize {
        match self.cache.as_ref().map(Mutex::lock) {
            Some(Ok(guard)) => guard.cap().get(),
            _ => 0,
        }
    }

    /// Check if caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            entries: self.len(),
            capacity: self.capacity(),
            hits,
            misses,
            hit_rate: (lookups > 0).then(|| hits as f64 / lookups as f64),
        }
    }
}

impl Default for EncodingCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for EncodingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodingCache")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Default number of cached chunks.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Cache statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that ran the encoder
    pub misses: u64,
    /// Hit rate (None before the first lookup)
    pub hit_rate: Option<f64>,
}
