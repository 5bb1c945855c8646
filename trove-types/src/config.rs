//! Configuration for every component of the pipeline.
//!
//! Each struct carries the documented defaults via `Default`; wiring these
//! from the environment is left to the embedding application.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base URLs and the shared timeout for the upstream provider endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Base URL of the JSON feed provider.
    pub json_base_url: String,
    /// Base URL of the XML feed provider.
    pub xml_base_url: String,
    /// Overall per-fetch timeout applied by the coordinator.
    pub timeout: Duration,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            json_base_url: "http://localhost:8080/mock/provider1".to_string(),
            xml_base_url: "http://localhost:8080/mock/provider2".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Fixed-window provider rate limiting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// When false, every check passes.
    pub enabled: bool,
    /// Duration of the counting window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: Duration::from_secs(60),
        }
    }
}

/// Freshness bonus per publication-age bucket, in score points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FreshnessWeights {
    /// Published within the last 7 days.
    pub within_week: f64,
    /// Published within the last 30 days.
    pub within_month: f64,
    /// Published within the last 90 days.
    pub within_quarter: f64,
}

impl Default for FreshnessWeights {
    fn default() -> Self {
        Self {
            within_week: 5.0,
            within_month: 3.0,
            within_quarter: 1.0,
        }
    }
}

/// Scoring multipliers and freshness weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Multiplier applied to the base score of video content.
    pub video_multiplier: f64,
    /// Multiplier applied to the base score of text content.
    pub text_multiplier: f64,
    /// Freshness bonus buckets.
    pub freshness: FreshnessWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            video_multiplier: 1.5,
            text_multiplier: 1.0,
            freshness: FreshnessWeights::default(),
        }
    }
}

/// Significance thresholds for the engagement change detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChangeThresholds {
    /// Relative change (percent of the old value) that counts as
    /// significant. Undefined when the old value is zero; any positive
    /// delta counts there.
    pub percent: u32,
    /// Absolute view delta that counts as significant.
    pub abs_views: i64,
    /// Absolute like delta that counts as significant.
    pub abs_likes: i64,
    /// Absolute reaction delta that counts as significant.
    pub abs_reactions: i64,
}

impl Default for ChangeThresholds {
    fn default() -> Self {
        Self {
            percent: 5,
            abs_views: 100,
            abs_likes: 10,
            abs_reactions: 5,
        }
    }
}

/// Periodic full-sync job settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyncJobConfig {
    /// When false, the job never starts.
    pub enabled: bool,
    /// Tick interval; the job also fires once immediately on start.
    pub interval: Duration,
    /// Whole-run retries after a failed run.
    pub retry_count: u32,
    /// Fixed delay between retries.
    pub retry_delay: Duration,
}

impl Default for SyncJobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(6 * 60 * 60),
            retry_count: 3,
            retry_delay: Duration::from_secs(30),
        }
    }
}

/// Periodic full-corpus score recalculation settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecalcJobConfig {
    /// When false, the job never starts.
    pub enabled: bool,
    /// Tick interval. Must not be shorter than a typical full walk; the
    /// job has no inner single-flight.
    pub interval: Duration,
    /// Contents recomputed per id batch.
    pub batch_size: u32,
}

impl Default for RecalcJobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(24 * 60 * 60),
            batch_size: 100,
        }
    }
}

/// Pagination bounds for the read path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the caller supplies none or an invalid one.
    pub default_page_size: u32,
    /// Largest accepted page size.
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Search read-through cache settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchCacheConfig {
    /// When false, every lookup misses and nothing is stored.
    pub enabled: bool,
    /// Entry time-to-live.
    pub ttl: Duration,
}

impl Default for SearchCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(60),
        }
    }
}

/// Admin-triggered async job settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JobsConfig {
    /// When false, admin triggers run inline.
    pub async_enabled: bool,
    /// Deadline for one async job; expiry fails the job.
    pub job_timeout: Duration,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            async_enabled: true,
            job_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Admin surface settings. The API-key check itself lives at the HTTP edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// When false, the admin surface is unavailable.
    pub enabled: bool,
    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
        }
    }
}

/// Top-level configuration for the whole pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TroveConfig {
    /// Upstream provider endpoints and timeout.
    pub providers: ProvidersConfig,
    /// Provider rate limiting.
    pub rate_limit: RateLimitConfig,
    /// Scoring multipliers and freshness weights.
    pub scoring: ScoringConfig,
    /// Engagement change-significance thresholds.
    pub thresholds: ChangeThresholds,
    /// Periodic sync job.
    pub sync: SyncJobConfig,
    /// Periodic score recalculation job.
    pub recalc: RecalcJobConfig,
    /// Read-path pagination bounds.
    pub pagination: PaginationConfig,
    /// Search cache.
    pub search_cache: SearchCacheConfig,
    /// Async admin jobs.
    pub jobs: JobsConfig,
    /// Admin surface.
    pub admin: AdminConfig,
}
