//! Eventually consistent read-through cache.
//!
//! Stores keep hot records here keyed by their primary key rendering.
//! Writes never wait on the cache: mutations hand the cache work to a
//! detached task (`spawn_*`), so a read racing a write may briefly observe
//! the previous state. Entries expire after a fixed TTL.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::warn;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

struct Inner<T> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<T>>>,
}

/// Shared, clonable cache of records keyed by primary key.
///
/// Cloning is cheap and every clone observes the same entries.
pub struct ReadCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ReadCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ReadCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadCache")
            .field("ttl", &self.inner.ttl)
            .finish_non_exhaustive()
    }
}

impl<T> Default for ReadCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReadCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                ttl,
                entries: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Returns the live entry for `key`, if any. An expired entry reads as
    /// absent and is dropped from the map by the read that observes it, so
    /// churning keys do not accumulate.
    pub async fn get(&self, key: &str) -> Option<T> {
        {
            let entries = self.inner.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Re-check under the write lock: a fresh set may have raced us.
        let mut entries = self.inner.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        None
    }

    /// Number of entries currently held, expired ones included until a read
    /// or eviction drops them.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    /// Returns whether the map holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// Inserts or replaces the entry for `key`.
    pub async fn set(&self, key: String, value: T) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.inner.ttl,
        };
        self.inner.entries.write().await.insert(key, entry);
    }

    /// Drops the entry for `key`, if present.
    pub async fn remove(&self, key: &str) {
        self.inner.entries.write().await.remove(key);
    }

    /// Inserts `value` on a detached task; the caller never waits.
    pub fn spawn_set(&self, key: String, value: T) {
        let cache = self.clone();
        tokio::spawn(async move {
            cache.set(key, value).await;
        });
    }

    /// Evicts `key` on a detached task; the caller never waits.
    pub fn spawn_evict(&self, key: String) {
        let cache = self.clone();
        tokio::spawn(async move {
            cache.remove(&key).await;
        });
    }

    /// Re-fetches the record behind `key` on a detached task and stores
    /// the result. A failed fetch is logged and leaves the previous entry
    /// in place; readers keep seeing it until it expires or a later
    /// refresh lands.
    pub fn spawn_refresh<F, E>(&self, key: String, fetch: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move {
            match fetch.await {
                Ok(value) => cache.set(key, value).await,
                Err(err) => warn!(key = %key, error = %err, "cache refresh failed"),
            }
        });
    }
}
