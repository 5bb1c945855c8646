use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::fetch::FetchCoordinator;
use crate::score::ScoreCalculator;
use trove_core::{
    ContentMetricsRepository, ContentRepository, ProviderRegistry, SyncHistoryRepository,
    TroveError, has_changed,
};
use trove_types::{
    ChangeThresholds, EngagementSnapshot, ProviderItem, SyncHistory, SyncResult,
};

/// Drives one sync run per provider: fetch, classify each item as
/// new/updated/skipped, persist, score, and audit.
///
/// The engine is the only writer of `sync_history` rows. Per-item errors are
/// counted and logged but never abort a run; only a primary-fetch failure
/// marks a whole run failed.
pub struct SyncEngine {
    coordinator: Arc<FetchCoordinator>,
    registry: Arc<ProviderRegistry>,
    contents: Arc<dyn ContentRepository>,
    metrics: Arc<dyn ContentMetricsRepository>,
    history: Arc<dyn SyncHistoryRepository>,
    scores: Arc<ScoreCalculator>,
    thresholds: ChangeThresholds,
}

impl SyncEngine {
    /// Build a sync engine over the given collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coordinator: Arc<FetchCoordinator>,
        registry: Arc<ProviderRegistry>,
        contents: Arc<dyn ContentRepository>,
        metrics: Arc<dyn ContentMetricsRepository>,
        history: Arc<dyn SyncHistoryRepository>,
        scores: Arc<ScoreCalculator>,
        thresholds: ChangeThresholds,
    ) -> Self {
        Self {
            coordinator,
            registry,
            contents,
            metrics,
            history,
            scores,
            thresholds,
        }
    }

    /// Run one sync per registered provider, sequentially in provider-id
    /// order. A failed provider never aborts the remaining ones.
    pub async fn sync_all(&self) -> Vec<SyncResult> {
        let mut providers = self.registry.all();
        providers.sort_by_key(|p| p.provider_id());

        let mut results = Vec::with_capacity(providers.len());
        for provider in providers {
            results.push(self.sync_provider(provider.provider_id()).await);
        }
        results
    }

    /// Run one sync for `provider_id`.
    ///
    /// Opens an in-progress audit row, fetches the provider's batch through
    /// the coordinator, applies each item in delivery order, and finalizes
    /// the audit with counters and classification. The returned result
    /// carries the same counters plus every error in encounter order; a
    /// primary-fetch failure shows up as a result whose
    /// [`status`](SyncResult::status) is failed with zero counters.
    pub async fn sync_provider(&self, provider_id: &str) -> SyncResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut result = SyncResult::new(provider_id, started_at);

        let mut audit = SyncHistory::open(provider_id, started_at);
        if let Err(e) = self.history.create(&mut audit).await {
            warn!(provider = provider_id, error = %e, "failed to open sync audit row");
        }

        let items = match self.coordinator.fetch_one(provider_id).await {
            Ok(items) => items,
            Err(e) => {
                error!(provider = provider_id, error = %e, "provider fetch failed");
                result.errors.push(format!("fetch failed: {e}"));
                result.duration = clock.elapsed();
                self.finalize(&mut audit, &result).await;
                return result;
            }
        };
        result.total_fetched = items.len() as i64;

        for item in &items {
            if let Err(e) = self.apply_item(item, &mut result).await {
                result.failed_contents += 1;
                result.errors.push(e.to_string());
                warn!(
                    provider = provider_id,
                    content = %item.provider_content_id,
                    error = %e,
                    "item sync failed"
                );
            }
        }

        result.duration = clock.elapsed();
        self.finalize(&mut audit, &result).await;
        info!(
            provider = provider_id,
            fetched = result.total_fetched,
            new = result.new_contents,
            updated = result.updated_contents,
            skipped = result.skipped_contents,
            failed = result.failed_contents,
            duration_ms = result.duration.as_millis() as u64,
            "sync completed"
        );
        result
    }

    /// Completion time of the most recent finished run for one provider.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn last_sync_time(
        &self,
        provider_id: &str,
    ) -> Result<Option<chrono::DateTime<Utc>>, TroveError> {
        self.history.last_sync_time(provider_id).await
    }

    /// The most recent runs across all providers.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn recent_history(&self, limit: u64) -> Result<Vec<SyncHistory>, TroveError> {
        self.history.recent(limit).await
    }

    async fn apply_item(
        &self,
        item: &ProviderItem,
        result: &mut SyncResult,
    ) -> Result<(), TroveError> {
        let existing = self
            .contents
            .get_by_provider_key(&item.provider_id, &item.provider_content_id)
            .await?;

        let Some(content) = existing else {
            self.scores.process_new_item(item).await?;
            result.new_contents += 1;
            return Ok(());
        };

        let Some(mut stored) = self.metrics.get_by_content_id(content.id).await? else {
            return Err(TroveError::store(format!(
                "content {} has no metrics row",
                content.id
            )));
        };

        let old = EngagementSnapshot::from(&stored);
        let new = EngagementSnapshot::from(item);
        if has_changed(&old, &new, &self.thresholds) {
            new.apply_to(&mut stored);
            self.metrics
                .update_by_content_id(content.id, &mut stored)
                .await?;
            self.scores.recalculate(content.id).await?;
            result.updated_contents += 1;
        } else {
            result.skipped_contents += 1;
        }
        Ok(())
    }

    /// Write the finished audit row. When the opening insert failed the row
    /// has no id yet and is created instead; persistence failures here are
    /// logged, never surfaced.
    async fn finalize(&self, audit: &mut SyncHistory, result: &SyncResult) {
        audit.status = result.status();
        audit.total_fetched = result.total_fetched;
        audit.new_contents = result.new_contents;
        audit.updated_contents = result.updated_contents;
        audit.skipped_contents = result.skipped_contents;
        audit.failed_contents = result.failed_contents;
        audit.error_message = result.errors.first().cloned();
        audit.completed_at = Some(Utc::now());
        audit.duration_ms = result.duration.as_millis() as i64;

        let persisted = if audit.id == 0 {
            self.history.create(audit).await
        } else {
            self.history.update(audit).await
        };
        if let Err(e) = persisted {
            warn!(provider = %audit.provider_id, error = %e, "failed to persist sync audit row");
        }
    }
}
