//! trove-core
//!
//! Core traits and domain logic shared across the trove workspace.
//!
//! - `provider`: the [`ContentProvider`] trait implemented by adapter crates.
//! - `registry`: the keyed provider set driving fan-out.
//! - `limiter`: the per-provider rate-limiter seam.
//! - `repository`: persistence traits for contents, metrics, and sync runs.
//! - `scoring`: the pure ranking function.
//! - `change`: engagement change-significance detection.
//! - `error`: the unified [`TroveError`] type.
#![warn(missing_docs)]

/// Engagement change-significance detection.
pub mod change;
/// Unified error type shared by all components.
pub mod error;
/// Per-provider rate-limiter seam.
pub mod limiter;
/// The provider adapter trait.
pub mod provider;
/// Keyed provider registry.
pub mod registry;
/// Persistence traits.
pub mod repository;
/// The pure ranking function.
pub mod scoring;

pub use change::has_changed;
pub use error::TroveError;
pub use limiter::RateLimiter;
pub use provider::{ContentProvider, RateLimit};
pub use registry::ProviderRegistry;
pub use repository::{ContentMetricsRepository, ContentRepository, SyncHistoryRepository};
pub use scoring::{ScoringEngine, round2};
