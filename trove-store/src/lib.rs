//! trove-store
//!
//! Postgres implementations of the `trove-core` repository traits, built on
//! `sqlx` with runtime-checked queries. The schema migration under
//! `migrations/` creates the three tables with their indexes: the unique
//! provider identity pair, the full-text and trigram indexes backing
//! search, and the descending score/date indexes backing the sort orders.
#![warn(missing_docs)]

/// Content repository.
pub mod content;
/// Sync-history repository.
pub mod history;
/// Metrics repository.
pub mod metrics;
/// Pool construction and migrations.
pub mod pool;

pub use content::PgContentRepository;
pub use history::PgSyncHistoryRepository;
pub use metrics::PgContentMetricsRepository;
pub use pool::{connect, migrate};

use trove_core::TroveError;

pub(crate) fn store_err(e: sqlx::Error) -> TroveError {
    TroveError::store(e.to_string())
}
