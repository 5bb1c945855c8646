//! trove-middleware
//!
//! In-process infrastructure adapters used by the orchestrator: the
//! fixed-window provider rate limiter and the TTL'd search cache. Both are
//! backed by `moka` caches so entries expire without a reaper task.
#![warn(missing_docs)]

/// Search read-through cache.
pub mod cache;
/// Fixed-window provider rate limiter.
pub mod limiter;

pub use cache::SearchCache;
pub use limiter::FixedWindowLimiter;
