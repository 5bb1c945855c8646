use async_trait::async_trait;

/// Per-provider rate limiting seam used by the fetch coordinator.
///
/// The contract is deliberately fail-open: `check` answers whether a request
/// may proceed and must return `true` when limiting is disabled or the
/// backing counter store is unavailable; `record` failures are swallowed by
/// implementations. The two operations are not atomic with respect to each
/// other, so bursting up to one extra request per window is acceptable.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Whether `provider_id` may issue a request under `limit` requests per
    /// window.
    async fn check(&self, provider_id: &str, limit: u32) -> bool;

    /// Count one request for `provider_id` in the current window.
    async fn record(&self, provider_id: &str);
}
