use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use trove_core::{ContentProvider, RateLimit, TroveError};
use trove_types::ProviderItem;

/// Configurable in-memory provider for tests.
///
/// Serves a scripted batch, optionally failing or delaying each fetch, and
/// counts how many fetches it served. The provider id must outlive the
/// process (a `&'static str`), matching the real adapter contract.
#[derive(Debug)]
pub struct MockProvider {
    id: &'static str,
    rate_limit: RateLimit,
    items: Mutex<Vec<ProviderItem>>,
    fail_with: Option<String>,
    delay: Duration,
    fetches: AtomicUsize,
}

impl MockProvider {
    /// A provider serving `items` on every fetch.
    #[must_use]
    pub fn with_items(id: &'static str, items: Vec<ProviderItem>) -> Self {
        Self {
            id,
            rate_limit: RateLimit::per_minute(100),
            items: Mutex::new(items),
            fail_with: None,
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A provider whose every fetch fails with `msg`.
    #[must_use]
    pub fn failing(id: &'static str, msg: impl Into<String>) -> Self {
        Self {
            id,
            rate_limit: RateLimit::per_minute(100),
            items: Mutex::new(Vec::new()),
            fail_with: Some(msg.into()),
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Override the declared rate limit.
    #[must_use]
    pub const fn rate_limited(mut self, requests_per_minute: u32) -> Self {
        self.rate_limit = RateLimit::per_minute(requests_per_minute);
        self
    }

    /// Sleep for `delay` inside every fetch, to exercise timeouts and
    /// overlap behavior.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replace the batch served by subsequent fetches.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn set_items(&self, items: Vec<ProviderItem>) {
        *self.items.lock().expect("mutex poisoned") = items;
    }

    /// Number of fetches served (including failed ones).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    fn provider_id(&self) -> &'static str {
        self.id
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit
    }

    async fn fetch_contents(&self) -> Result<Vec<ProviderItem>, TroveError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(msg) = &self.fail_with {
            return Err(TroveError::provider(self.id, msg.clone()));
        }
        Ok(self.items.lock().expect("mutex poisoned").clone())
    }
}
