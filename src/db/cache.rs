use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::AppResult;

/// Default age after which a cached value is refetched on access
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Default time an unused entry survives before eviction
pub const DEFAULT_EVICT_AFTER: Duration = Duration::from_secs(10 * 60);

struct Entry<V> {
    value: Arc<V>,
    fetched_at: Instant,
    last_used: Instant,
}

/// Pull-based cache with a staleness window
///
/// `get_or_refresh` serves the stored value while it is younger than
/// `stale_after` and refetches otherwise. A failed refetch falls back to the
/// stale value when one exists. Entries nobody has read for `evict_after` are
/// dropped on the next access.
pub struct StaleCache<K, V> {
    name: &'static str,
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    stale_after: Duration,
    evict_after: Duration,
}

impl<K, V> Clone for StaleCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            entries: self.entries.clone(),
            stale_after: self.stale_after,
            evict_after: self.evict_after,
        }
    }
}

impl<K, V> StaleCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(name: &'static str, stale_after: Duration, evict_after: Duration) -> Self {
        Self {
            name,
            entries: Arc::new(RwLock::new(HashMap::new())),
            stale_after,
            evict_after,
        }
    }

    pub fn with_defaults(name: &'static str) -> Self {
        Self::new(name, DEFAULT_STALE_AFTER, DEFAULT_EVICT_AFTER)
    }

    /// Returns the cached value for `key`, running `fetch` when it is missing or stale
    pub async fn get_or_refresh<F, Fut>(&self, key: K, fetch: F) -> AppResult<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<V>>,
    {
        let now = Instant::now();
        self.evict_unused(now).await;

        let cached = {
            let mut entries = self.entries.write().await;
            entries.get_mut(&key).map(|entry| {
                entry.last_used = now;
                (entry.value.clone(), now.duration_since(entry.fetched_at))
            })
        };

        if let Some((value, age)) = &cached {
            if *age < self.stale_after {
                tracing::debug!(cache = self.name, key = ?key, "Cache hit");
                return Ok(value.clone());
            }
        }

        tracing::debug!(cache = self.name, key = ?key, stale = cached.is_some(), "Cache refresh");

        match fetch().await {
            Ok(fresh) => {
                let value = Arc::new(fresh);
                let fetched_at = Instant::now();
                self.entries.write().await.insert(
                    key,
                    Entry {
                        value: value.clone(),
                        fetched_at,
                        last_used: fetched_at,
                    },
                );
                Ok(value)
            }
            Err(e) => match cached {
                Some((stale, _)) => {
                    tracing::warn!(
                        cache = self.name,
                        key = ?key,
                        error = %e,
                        "Refresh failed, serving stale value"
                    );
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Drops the entry for `key` so the next read refetches
    pub async fn invalidate(&self, key: &K) {
        if self.entries.write().await.remove(key).is_some() {
            tracing::debug!(cache = self.name, key = ?key, "Cache entry invalidated");
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn evict_unused(&self, now: Instant) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_used) < self.evict_after);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(cache = self.name, evicted, "Evicted unused cache entries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> StaleCache<&'static str, usize> {
        StaleCache::new("test", Duration::from_secs(300), Duration::from_secs(600))
    }

    async fn counted(calls: &AtomicUsize) -> AppResult<usize> {
        Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_value_is_served_from_cache() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_refresh("k", || counted(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = cache.get_or_refresh("k", || counted(&calls)).await.unwrap();

        assert_eq!(*first, 1);
        assert_eq!(*second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_value_is_refetched() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        cache.get_or_refresh("k", || counted(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(300)).await;
        let refreshed = cache.get_or_refresh("k", || counted(&calls)).await.unwrap();

        assert_eq!(*refreshed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_serves_stale_value() {
        let cache = cache();

        cache.get_or_refresh("k", || async { Ok(7) }).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        let value = cache
            .get_or_refresh("k", || async {
                Err(AppError::Internal("backend down".to_string()))
            })
            .await
            .unwrap();

        assert_eq!(*value, 7);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_propagates() {
        let cache = cache();
        let result = cache
            .get_or_refresh("k", || async {
                Err(AppError::Internal("backend down".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unused_entries_are_evicted() {
        let cache = cache();

        cache.get_or_refresh("old", || async { Ok(1) }).await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.get_or_refresh("recent", || async { Ok(2) }).await.unwrap();
        assert_eq!(cache.len().await, 2);

        tokio::time::advance(Duration::from_secs(450)).await;
        cache.get_or_refresh("recent", || async { Ok(3) }).await.unwrap();

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        cache.get_or_refresh("k", || counted(&calls)).await.unwrap();
        cache.invalidate(&"k").await;
        let value = cache.get_or_refresh("k", || counted(&calls)).await.unwrap();

        assert_eq!(*value, 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = cache();
        let a = cache.get_or_refresh("a", || async { Ok(1) }).await.unwrap();
        let b = cache.get_or_refresh("b", || async { Ok(2) }).await.unwrap();
        assert_eq!((*a, *b), (1, 2));
    }
}
