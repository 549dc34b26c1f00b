//! Decoded document cache
//!
//! Entries are keyed by `(key, etag)`, so a stale entry can never be served
//! for a newer version; invalidation only reclaims memory.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use docstore_core::{Etag, JsonValue};
use lru::LruCache;
use parking_lot::Mutex;

/// A decoded document held by the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDocument {
    /// Decoded data column
    pub data: JsonValue,
    /// Decoded metadata column
    pub metadata: JsonValue,
    /// Stored size of both columns
    pub size: u64,
}

/// Cache of decoded documents keyed by `(key, etag)`
pub trait DocumentCache: Send + Sync {
    /// Look up a decoded document
    fn get(&self, key: &str, etag: Etag) -> Option<Arc<CachedDocument>>;

    /// Store a decoded document
    fn put(&self, key: &str, etag: Etag, document: CachedDocument);

    /// Drop the entry for `(key, etag)` if present
    fn invalidate(&self, key: &str, etag: Etag);
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that missed
    pub misses: u64,
    /// Entries currently held
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    key: String,
    etag: Etag,
}

/// Bounded LRU document cache
#[derive(Debug)]
pub struct LruDocumentCache {
    entries: Mutex<LruCache<CacheKey, Arc<CachedDocument>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LruDocumentCache {
    /// Create a cache holding at most `capacity` documents
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }
}

impl DocumentCache for LruDocumentCache {
    fn get(&self, key: &str, etag: Etag) -> Option<Arc<CachedDocument>> {
        let lookup = CacheKey {
            key: key.to_string(),
            etag,
        };
        let found = self.entries.lock().get(&lookup).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn put(&self, key: &str, etag: Etag, document: CachedDocument) {
        self.entries.lock().put(
            CacheKey {
                key: key.to_string(),
                etag,
            },
            Arc::new(document),
        );
    }

    fn invalidate(&self, key: &str, etag: Etag) {
        self.entries.lock().pop(&CacheKey {
            key: key.to_string(),
            etag,
        });
    }
}

/// Cache that never holds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDocumentCache;

impl DocumentCache for NoopDocumentCache {
    fn get(&self, _key: &str, _etag: Etag) -> Option<Arc<CachedDocument>> {
        None
    }

    fn put(&self, _key: &str, _etag: Etag, _document: CachedDocument) {}

    fn invalidate(&self, _key: &str, _etag: Etag) {}
}
