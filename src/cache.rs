//! Memoization store for computed localized URLs.
//!
//! Keys are derived from the target locale and a SHA-256 digest of the source
//! URL, so the key space stays bounded in length no matter how long the URL is.

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Entries kept by [`MemoryCache::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Read-through string cache.
///
/// Implementations must be safe to share between requests. Two requests that
/// miss on the same key may both compute; the last write wins.
pub trait CacheStore: Send + Sync {
    /// Return the cached value for `key`, or run `compute`, store its result
    /// for `ttl` and return it.
    fn remember_string(&self, key: &str, ttl: Duration, compute: &dyn Fn() -> String) -> String;

    /// Drop every entry whose key starts with `prefix`. Returns how many were removed.
    fn forget_prefix(&self, prefix: &str) -> usize;
}

/// Cache key for a localized URL: `{prefix}:url:{locale}:{sha256(url)}`.
pub fn url_cache_key(prefix: &str, locale: &str, url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}:url:{}:{:x}", prefix, locale, digest)
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process [`CacheStore`] with per-entry expiry and LRU eviction.
///
/// Keys come from request URLs, so the store is bounded: once full, expired
/// entries are swept first and the least recently used entry goes next.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("MemoryCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero capacity falls back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        sweep(&mut entries, Instant::now())
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let found = entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
        match found {
            Some(Some(value)) => Some(value),
            Some(None) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }
}

fn sweep(entries: &mut LruCache<String, CacheEntry>, now: Instant) -> usize {
    let expired: Vec<String> = entries
        .iter()
        .filter(|(_, entry)| !entry.is_live(now))
        .map(|(key, _)| key.clone())
        .collect();
    for key in &expired {
        entries.pop(key);
    }
    expired.len()
}

impl CacheStore for MemoryCache {
    fn remember_string(&self, key: &str, ttl: Duration, compute: &dyn Fn() -> String) -> String {
        if let Some(value) = self.lookup(key) {
            return value;
        }

        // Lock is not held while computing.
        let value = compute();
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == entries.cap().get() && !entries.contains(key) {
            sweep(&mut entries, now);
        }
        entries.put(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at: now.checked_add(ttl),
            },
        );
        value
    }

    fn forget_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let matching: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            entries.pop(key);
        }
        matching.len()
    }
}
