use std::sync::Arc;

use moka::future::Cache;

use trove_types::{SearchCacheConfig, SearchPage};

/// TTL'd read-through cache for search pages, keyed by the normalized query.
///
/// A disabled cache misses on every lookup and stores nothing, so callers
/// need no separate code path. Lookups and inserts never fail; the store
/// remains authoritative.
pub struct SearchCache {
    enabled: bool,
    inner: Cache<String, Arc<SearchPage>>,
}

impl SearchCache {
    /// Build a cache from configuration.
    #[must_use]
    pub fn new(cfg: &SearchCacheConfig) -> Self {
        Self {
            enabled: cfg.enabled,
            inner: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(cfg.ttl)
                .build(),
        }
    }

    /// Fetch a cached page, if present and fresh.
    pub async fn get(&self, key: &str) -> Option<Arc<SearchPage>> {
        if !self.enabled {
            return None;
        }
        self.inner.get(key).await
    }

    /// Store a page under `key` with the configured TTL.
    pub async fn put(&self, key: String, page: SearchPage) {
        if !self.enabled {
            return;
        }
        self.inner.insert(key, Arc::new(page)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use trove_types::SearchPage;

    use super::*;

    #[tokio::test]
    async fn round_trips_pages() {
        let cache = SearchCache::new(&SearchCacheConfig {
            enabled: true,
            ttl: Duration::from_secs(60),
        });

        assert!(cache.get("k").await.is_none());
        cache
            .put(
                "k".into(),
                SearchPage {
                    items: Vec::new(),
                    total: 7,
                },
            )
            .await;
        assert_eq!(cache.get("k").await.unwrap().total, 7);
    }

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = SearchCache::new(&SearchCacheConfig {
            enabled: false,
            ttl: Duration::from_secs(60),
        });

        cache
            .put(
                "k".into(),
                SearchPage {
                    items: Vec::new(),
                    total: 1,
                },
            )
            .await;
        assert!(cache.get("k").await.is_none());
    }
}
