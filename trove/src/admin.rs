use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::error;

use crate::jobs::JobRegistry;
use crate::score::ScoreCalculator;
use crate::sync::SyncEngine;
use trove_core::{ContentRepository, ProviderRegistry, SyncHistoryRepository, TroveError};
use trove_types::{
    ContentType, HealthReport, JobInfo, JobStatus, JobsConfig, ProviderOverview, SyncHistory,
    SyncResult, SyncStatus,
};

/// Outcome of a sync trigger: a job id when dispatched asynchronously, the
/// run results when executed inline.
#[derive(Debug)]
pub enum SyncDispatch {
    /// Async dispatch; poll the job registry with this id.
    Job(String),
    /// Inline execution, one result per provider synced.
    Results(Vec<SyncResult>),
}

/// Outcome of a recalculation trigger.
#[derive(Debug)]
pub enum RecalcDispatch {
    /// Async dispatch; poll the job registry with this id.
    Job(String),
    /// Inline execution; number of contents recomputed.
    Processed(u64),
}

/// Scope of a recalculation request. Requests must name exactly one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecalcScope {
    /// One content by id.
    Content(i64),
    /// Every live content of one type.
    Type(ContentType),
    /// The whole live corpus.
    All,
}

impl RecalcScope {
    /// Validate a raw request body into a scope.
    ///
    /// # Errors
    /// Returns [`TroveError::InvalidArg`] when zero or more than one scope
    /// is supplied, when the content id is not positive, or when the
    /// content type is unknown.
    pub fn from_request(
        content_id: Option<i64>,
        content_type: Option<&str>,
        recalculate_all: bool,
    ) -> Result<Self, TroveError> {
        let supplied =
            usize::from(content_id.is_some()) + usize::from(content_type.is_some()) + usize::from(recalculate_all);
        if supplied != 1 {
            return Err(TroveError::InvalidArg(
                "exactly one of content_id, content_type, or recalculate_all is required".into(),
            ));
        }
        if let Some(id) = content_id {
            if id <= 0 {
                return Err(TroveError::InvalidArg(
                    "content_id must be positive".into(),
                ));
            }
            return Ok(Self::Content(id));
        }
        if let Some(raw) = content_type {
            let t = ContentType::parse(raw).ok_or_else(|| {
                TroveError::InvalidArg(format!("invalid content_type: {raw}"))
            })?;
            return Ok(Self::Type(t));
        }
        Ok(Self::All)
    }
}

/// Admin surface behind the edge's API-key check: manual sync and
/// recalculation triggers, operational history, provider overviews and
/// probes, and soft deletion.
pub struct AdminService {
    engine: Arc<SyncEngine>,
    calculator: Arc<ScoreCalculator>,
    registry: Arc<ProviderRegistry>,
    contents: Arc<dyn ContentRepository>,
    history: Arc<dyn SyncHistoryRepository>,
    jobs: Arc<JobRegistry>,
    jobs_cfg: JobsConfig,
    recalc_batch: u32,
    provider_timeout: Duration,
}

impl AdminService {
    /// Build the admin surface over the given collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<SyncEngine>,
        calculator: Arc<ScoreCalculator>,
        registry: Arc<ProviderRegistry>,
        contents: Arc<dyn ContentRepository>,
        history: Arc<dyn SyncHistoryRepository>,
        jobs: Arc<JobRegistry>,
        jobs_cfg: JobsConfig,
        recalc_batch: u32,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            calculator,
            registry,
            contents,
            history,
            jobs,
            jobs_cfg,
            recalc_batch,
            provider_timeout,
        }
    }

    /// Trigger a sync of one provider (or all) now.
    ///
    /// `run_async = None` follows the configured default. Async dispatch
    /// registers a `sync-*` job, runs under the job timeout (expiry fails
    /// the job with a timeout reason), and returns immediately; a provider
    /// whose run classifies as failed fails the job with the first error.
    pub async fn trigger_sync(
        &self,
        provider_id: Option<String>,
        run_async: Option<bool>,
    ) -> SyncDispatch {
        let provider_id = provider_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if !run_async.unwrap_or(self.jobs_cfg.async_enabled) {
            return SyncDispatch::Results(self.run_sync(provider_id).await);
        }

        let job = self.jobs.create("sync");
        let job_id = job.id.clone();
        let jobs = self.jobs.clone();
        let engine = self.engine.clone();
        let deadline = self.jobs_cfg.job_timeout;

        tokio::spawn(async move {
            jobs.update(&job_id, JobStatus::Running, 0, None);
            let work = async {
                match provider_id.as_deref() {
                    Some(pid) => vec![engine.sync_provider(pid).await],
                    None => engine.sync_all().await,
                }
            };
            match tokio::time::timeout(deadline, work).await {
                Ok(results) => {
                    let failure = results
                        .iter()
                        .find(|r| r.status() == SyncStatus::Failed)
                        .and_then(|r| r.errors.first().cloned());
                    match failure {
                        Some(msg) => {
                            error!(job = %job_id, error = %msg, "async sync failed");
                            jobs.update(&job_id, JobStatus::Failed, 100, Some(msg));
                        }
                        None => jobs.update(&job_id, JobStatus::Completed, 100, None),
                    }
                }
                Err(_) => {
                    error!(job = %job_id, "async sync timed out");
                    jobs.update(
                        &job_id,
                        JobStatus::Failed,
                        100,
                        Some(format!("job timed out after {deadline:?}")),
                    );
                }
            }
        });
        SyncDispatch::Job(job.id)
    }

    async fn run_sync(&self, provider_id: Option<String>) -> Vec<SyncResult> {
        match provider_id.as_deref() {
            Some(pid) => vec![self.engine.sync_provider(pid).await],
            None => self.engine.sync_all().await,
        }
    }

    /// Trigger a score recalculation for the given scope.
    ///
    /// Async dispatch mirrors [`Self::trigger_sync`] with a `recalc-*` job.
    ///
    /// # Errors
    /// Inline execution propagates calculator failures; async dispatch
    /// never fails here (failures land on the job record).
    pub async fn recalculate(
        &self,
        scope: RecalcScope,
        run_async: Option<bool>,
    ) -> Result<RecalcDispatch, TroveError> {
        if !run_async.unwrap_or(self.jobs_cfg.async_enabled) {
            let processed = self.run_recalc(scope).await?;
            return Ok(RecalcDispatch::Processed(processed));
        }

        let job = self.jobs.create("recalc");
        let job_id = job.id.clone();
        let jobs = self.jobs.clone();
        let calculator = self.calculator.clone();
        let batch = self.recalc_batch;
        let deadline = self.jobs_cfg.job_timeout;

        tokio::spawn(async move {
            jobs.update(&job_id, JobStatus::Running, 0, None);
            let work = async {
                match scope {
                    RecalcScope::Content(id) => calculator.recalculate(id).await.map(|_| 1u64),
                    RecalcScope::Type(t) => calculator.recalculate_by_type(t, batch).await,
                    RecalcScope::All => calculator.recalculate_all(batch).await,
                }
            };
            match tokio::time::timeout(deadline, work).await {
                Ok(Ok(_)) => jobs.update(&job_id, JobStatus::Completed, 100, None),
                Ok(Err(e)) => {
                    error!(job = %job_id, error = %e, "async score recalculation failed");
                    jobs.update(&job_id, JobStatus::Failed, 100, Some(e.to_string()));
                }
                Err(_) => {
                    error!(job = %job_id, "async score recalculation timed out");
                    jobs.update(
                        &job_id,
                        JobStatus::Failed,
                        100,
                        Some(format!("job timed out after {deadline:?}")),
                    );
                }
            }
        });
        Ok(RecalcDispatch::Job(job.id))
    }

    async fn run_recalc(&self, scope: RecalcScope) -> Result<u64, TroveError> {
        match scope {
            RecalcScope::Content(id) => self.calculator.recalculate(id).await.map(|_| 1),
            RecalcScope::Type(t) => self.calculator.recalculate_by_type(t, self.recalc_batch).await,
            RecalcScope::All => self.calculator.recalculate_all(self.recalc_batch).await,
        }
    }

    /// Sync-run history filtered by provider and/or status, newest first,
    /// plus the total count for the same filters. The limit is clamped into
    /// (0, 200], defaulting to 50.
    ///
    /// # Errors
    /// Returns [`TroveError::InvalidArg`] for an unknown status string and
    /// propagates store failures.
    pub async fn sync_history(
        &self,
        provider_id: Option<&str>,
        status: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<SyncHistory>, i64), TroveError> {
        let limit = if limit == 0 || limit > 200 { 50 } else { limit };
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(SyncStatus::parse(raw).ok_or_else(|| {
                TroveError::InvalidArg(format!("invalid sync status: {raw}"))
            })?),
            None => None,
        };

        let rows = self.history.list(provider_id, status, limit, offset).await?;
        let total = self.history.count(provider_id, status).await?;
        Ok((rows, total))
    }

    /// Per-provider content counts, average scores, and last-sync outcomes.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn providers_overview(&self) -> Result<Vec<ProviderOverview>, TroveError> {
        let counts = self.contents.count_by_provider().await?;
        let mut provider_ids: Vec<String> = counts.keys().cloned().collect();
        provider_ids.sort_unstable();

        let mut out = Vec::with_capacity(provider_ids.len());
        for provider_id in provider_ids {
            let average_score = self.contents.average_score_by_provider(&provider_id).await?;
            let last = self.history.last_sync(&provider_id).await?;
            let (last_sync, last_sync_status) = last
                .filter(|h| h.completed_at.is_some())
                .map_or((None, None), |h| (h.completed_at, Some(h.status)));
            out.push(ProviderOverview {
                content_count: counts.get(&provider_id).copied().unwrap_or(0),
                provider_id,
                average_score,
                last_sync,
                last_sync_status,
            });
        }
        Ok(out)
    }

    /// Probe every registered provider by fetching under the provider
    /// timeout, reporting reachability and latency per provider.
    pub async fn health_check(&self) -> Vec<HealthReport> {
        let mut providers = self.registry.all();
        providers.sort_by_key(|p| p.provider_id());

        let mut out = Vec::with_capacity(providers.len());
        for provider in providers {
            let checked_at = Utc::now();
            let clock = Instant::now();
            let outcome = tokio::time::timeout(self.provider_timeout, provider.fetch_contents()).await;
            let error = match outcome {
                Ok(Ok(_)) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(_) => Some("probe timed out".to_string()),
            };
            out.push(HealthReport {
                provider_id: provider.provider_id().to_string(),
                healthy: error.is_none(),
                response_time_ms: clock.elapsed().as_millis() as u64,
                error,
                checked_at,
            });
        }
        out
    }

    /// Soft-delete one content; it disappears from every read-path query.
    ///
    /// # Errors
    /// Returns [`TroveError::InvalidArg`] for a non-positive id and
    /// propagates store failures.
    pub async fn delete_content(&self, id: i64) -> Result<(), TroveError> {
        if id <= 0 {
            return Err(TroveError::InvalidArg(
                "content id must be positive".into(),
            ));
        }
        self.contents.soft_delete(id).await
    }

    /// Snapshot of one async job's record.
    #[must_use]
    pub fn job(&self, id: &str) -> Option<JobInfo> {
        self.jobs.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recalc_scope_requires_exactly_one_form() {
        assert!(RecalcScope::from_request(None, None, false).is_err());
        assert!(RecalcScope::from_request(Some(1), None, true).is_err());
        assert!(RecalcScope::from_request(Some(1), Some("video"), false).is_err());

        assert_eq!(
            RecalcScope::from_request(Some(7), None, false).unwrap(),
            RecalcScope::Content(7)
        );
        assert_eq!(
            RecalcScope::from_request(None, Some("video"), false).unwrap(),
            RecalcScope::Type(ContentType::Video)
        );
        assert_eq!(
            RecalcScope::from_request(None, None, true).unwrap(),
            RecalcScope::All
        );
    }

    #[test]
    fn recalc_scope_rejects_bad_values() {
        assert!(RecalcScope::from_request(Some(0), None, false).is_err());
        assert!(RecalcScope::from_request(None, Some("audio"), false).is_err());
    }
}
