use async_trait::async_trait;

use crate::TroveError;
use trove_types::ProviderItem;

/// Declared request budget for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per one-minute window.
    pub requests_per_minute: u32,
}

impl RateLimit {
    /// Build a per-minute rate limit.
    #[must_use]
    pub const fn per_minute(requests: u32) -> Self {
        Self {
            requests_per_minute: requests,
        }
    }
}

/// A single upstream content source.
///
/// Implementations own all transport concerns: URL composition, timeouts at
/// the HTTP-client level, status-code checks, and payload decoding. A batch
/// is all-or-nothing: an upstream item missing its identity field fails the
/// whole fetch rather than yielding a partial batch.
#[async_trait]
pub trait ContentProvider: Send + Sync + std::fmt::Debug {
    /// Stable identifier for this provider (e.g. "provider1"). Keys the
    /// registry, rate-limit counters, and sync-history rows.
    fn provider_id(&self) -> &'static str;

    /// The provider's declared request budget.
    fn rate_limit(&self) -> RateLimit;

    /// Fetch the provider's current batch, normalized.
    ///
    /// # Errors
    /// Returns [`TroveError::Provider`] on transport failure, a non-2xx
    /// response, or a malformed payload, and [`TroveError::Data`] when an
    /// upstream item lacks its identity field.
    async fn fetch_contents(&self) -> Result<Vec<ProviderItem>, TroveError>;
}
