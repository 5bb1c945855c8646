use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use trove_core::RateLimiter;
use trove_types::RateLimitConfig;

/// Slack added to each window's expiry so a counter outlives its window.
const WINDOW_SLACK: Duration = Duration::from_secs(2);

/// Fixed-window request counter keyed by `(provider_id, window index)`.
///
/// The window index is `floor(unix_now / window_secs)`, so every window gets
/// a fresh counter entry; entries expire `window + 2s` after creation.
/// `check` and `record` are not atomic with respect to each other, which
/// admits at most one extra request per window. A disabled limiter admits
/// everything.
pub struct FixedWindowLimiter {
    enabled: bool,
    window_secs: u64,
    counters: Cache<String, Arc<AtomicU32>>,
}

impl FixedWindowLimiter {
    /// Build a limiter from configuration.
    #[must_use]
    pub fn new(cfg: &RateLimitConfig) -> Self {
        let window_secs = cfg.window.as_secs().max(1);
        Self {
            enabled: cfg.enabled,
            window_secs,
            counters: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(cfg.window + WINDOW_SLACK)
                .build(),
        }
    }

    fn window_key(&self, provider_id: &str, now_unix: i64) -> String {
        let bucket = now_unix / self.window_secs as i64;
        format!("rl:{provider_id}:{bucket}")
    }

    async fn check_at(&self, provider_id: &str, limit: u32, now_unix: i64) -> bool {
        if !self.enabled {
            return true;
        }
        let key = self.window_key(provider_id, now_unix);
        let count = self
            .counters
            .get(&key)
            .await
            .map_or(0, |c| c.load(Ordering::Relaxed));
        count < limit
    }

    async fn record_at(&self, provider_id: &str, now_unix: i64) {
        if !self.enabled {
            return;
        }
        let key = self.window_key(provider_id, now_unix);
        let counter = self
            .counters
            .get_with(key, async { Arc::new(AtomicU32::new(0)) })
            .await;
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn check(&self, provider_id: &str, limit: u32) -> bool {
        self.check_at(provider_id, limit, chrono::Utc::now().timestamp())
            .await
    }

    async fn record(&self, provider_id: &str) {
        self.record_at(provider_id, chrono::Utc::now().timestamp())
            .await;
    }
}
