//! Persistence traits implemented by the store gateway.
//!
//! Every read query excludes soft-deleted contents; sync-history rows are
//! never soft-deleted. Implementations map their driver errors onto
//! [`TroveError::Store`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::TroveError;
use trove_types::{
    Content, ContentMetrics, ContentType, ContentWithMetrics, Pagination, SearchSort,
    SyncHistory, SyncStatus,
};

/// Persistence for content rows plus the read queries backing search and
/// stats.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert a new content row, assigning `id`, `created_at`, and
    /// `updated_at` on the passed value.
    async fn create(&self, content: &mut Content) -> Result<(), TroveError>;

    /// Fetch one live content by its public id.
    async fn get_by_id(&self, id: i64) -> Result<Option<Content>, TroveError>;

    /// Fetch one content by its provider identity pair, live or deleted.
    async fn get_by_provider_key(
        &self,
        provider_id: &str,
        provider_content_id: &str,
    ) -> Result<Option<Content>, TroveError>;

    /// Update an existing content row in place, refreshing `updated_at`.
    async fn update(&self, content: &mut Content) -> Result<(), TroveError>;

    /// Mark a content as deleted. Deleted contents disappear from every
    /// read query; the identity pair stays reserved.
    async fn soft_delete(&self, id: i64) -> Result<(), TroveError>;

    /// Insert many contents, ignoring conflicts on the provider identity
    /// pair.
    async fn bulk_insert(&self, contents: &[Content]) -> Result<(), TroveError>;

    /// Ids of live contents, ordered by id, for batch walks.
    async fn list_ids(&self, offset: u64, limit: u64) -> Result<Vec<i64>, TroveError>;

    /// Ids of live contents of one type, ordered by id.
    async fn list_ids_by_type(
        &self,
        content_type: ContentType,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<i64>, TroveError>;

    /// Count of live contents.
    async fn count_all(&self) -> Result<i64, TroveError>;

    /// Live content count per type.
    async fn count_by_type(&self) -> Result<HashMap<ContentType, i64>, TroveError>;

    /// Live content count per provider.
    async fn count_by_provider(&self) -> Result<HashMap<String, i64>, TroveError>;

    /// Average final score across live contents; zero for an empty corpus.
    async fn average_score(&self) -> Result<f64, TroveError>;

    /// Average final score across one provider's live contents.
    async fn average_score_by_provider(&self, provider_id: &str) -> Result<f64, TroveError>;

    /// Ranked, filtered, paginated search over live contents joined with
    /// their metrics.
    ///
    /// An empty (or whitespace) keyword matches everything. A non-empty
    /// keyword matches via token-level full text over title and description
    /// unioned with approximate (trigram-style) matches above a low
    /// similarity floor. Returns the requested slice plus the total count of
    /// the unpaginated match. Out-of-range pagination is normalized.
    async fn search_with_filters(
        &self,
        keyword: &str,
        content_type: Option<ContentType>,
        pagination: Pagination,
        sort: SearchSort,
    ) -> Result<(Vec<ContentWithMetrics>, i64), TroveError>;

    /// One live content joined with its metrics, by public id.
    async fn detail_by_id(&self, id: i64) -> Result<Option<ContentWithMetrics>, TroveError>;
}

/// Persistence for engagement metrics rows.
#[async_trait]
pub trait ContentMetricsRepository: Send + Sync {
    /// Insert a new metrics row, assigning `id` and timestamps on the
    /// passed value.
    async fn create(&self, metrics: &mut ContentMetrics) -> Result<(), TroveError>;

    /// Fetch the metrics row owned by `content_id`.
    async fn get_by_content_id(
        &self,
        content_id: i64,
    ) -> Result<Option<ContentMetrics>, TroveError>;

    /// Update the metrics row owned by `content_id` in place.
    async fn update_by_content_id(
        &self,
        content_id: i64,
        metrics: &mut ContentMetrics,
    ) -> Result<(), TroveError>;

    /// Upsert many metrics rows keyed by `content_id`; the upsert must be
    /// atomic per content id.
    async fn bulk_upsert(&self, metrics: &[ContentMetrics]) -> Result<(), TroveError>;
}

/// Persistence for sync-run audit rows. Only the sync engine writes here.
#[async_trait]
pub trait SyncHistoryRepository: Send + Sync {
    /// Insert a new audit row, assigning `id` on the passed value.
    async fn create(&self, history: &mut SyncHistory) -> Result<(), TroveError>;

    /// Update an existing audit row by its id.
    async fn update(&self, history: &SyncHistory) -> Result<(), TroveError>;

    /// The most recent run for one provider, by start time.
    async fn last_sync(&self, provider_id: &str) -> Result<Option<SyncHistory>, TroveError>;

    /// Completion time of the most recent finished run for one provider.
    async fn last_sync_time(
        &self,
        provider_id: &str,
    ) -> Result<Option<DateTime<Utc>>, TroveError> {
        Ok(self
            .last_sync(provider_id)
            .await?
            .and_then(|h| h.completed_at))
    }

    /// Runs filtered by provider and/or status, newest first.
    async fn list(
        &self,
        provider_id: Option<&str>,
        status: Option<SyncStatus>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<SyncHistory>, TroveError>;

    /// Count of runs matching the same filters as [`Self::list`].
    async fn count(
        &self,
        provider_id: Option<&str>,
        status: Option<SyncStatus>,
    ) -> Result<i64, TroveError>;

    /// The most recent runs across all providers.
    async fn recent(&self, limit: u64) -> Result<Vec<SyncHistory>, TroveError>;
}
