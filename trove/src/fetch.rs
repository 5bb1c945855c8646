use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::warn;

use trove_core::{ProviderRegistry, RateLimiter, TroveError};
use trove_types::ProviderItem;

/// Concurrent, rate-checked, timeout-bounded invocation of the registered
/// provider adapters.
pub struct FetchCoordinator {
    registry: Arc<ProviderRegistry>,
    limiter: Arc<dyn RateLimiter>,
    timeout: Duration,
}

impl FetchCoordinator {
    /// Build a coordinator over `registry` with the given per-fetch timeout.
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        limiter: Arc<dyn RateLimiter>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            limiter,
            timeout,
        }
    }

    /// Fetch one provider's current batch.
    ///
    /// A rate-limited provider yields an empty batch without error; the
    /// limiter sheds load at the source rather than surfacing it as a
    /// failure. The adapter call runs under the configured timeout.
    ///
    /// # Errors
    /// Returns [`TroveError::NotFound`] for an unknown provider id,
    /// [`TroveError::ProviderTimeout`] when the fetch exceeds the timeout,
    /// and propagates adapter errors otherwise.
    pub async fn fetch_one(&self, provider_id: &str) -> Result<Vec<ProviderItem>, TroveError> {
        let provider = self.registry.get(provider_id)?;
        let limit = provider.rate_limit().requests_per_minute;

        if !self.limiter.check(provider_id, limit).await {
            warn!(provider = provider_id, "rate limit reached; skipping fetch");
            return Ok(Vec::new());
        }
        self.limiter.record(provider_id).await;

        match tokio::time::timeout(self.timeout, provider.fetch_contents()).await {
            Ok(result) => result,
            Err(_) => Err(TroveError::provider_timeout(provider_id)),
        }
    }

    /// Fan out over every registered provider concurrently, one task per
    /// provider, each following the single-provider contract.
    ///
    /// Per-provider failures do not cancel siblings. Returns the
    /// concatenation of successful batches plus a per-provider error map.
    pub async fn fetch_all(&self) -> (Vec<ProviderItem>, HashMap<String, TroveError>) {
        let mut tasks: FuturesUnordered<_> = self
            .registry
            .all()
            .into_iter()
            .map(|provider| {
                let id = provider.provider_id();
                async move { (id, self.fetch_one(id).await) }
            })
            .collect();

        let mut items = Vec::new();
        let mut errors = HashMap::new();
        while let Some((id, result)) = tasks.next().await {
            match result {
                Ok(batch) => items.extend(batch),
                Err(e) => {
                    warn!(provider = id, error = %e, "provider fetch failed");
                    errors.insert(id.to_string(), e);
                }
            }
        }
        (items, errors)
    }
}
