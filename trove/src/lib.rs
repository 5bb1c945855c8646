//! trove
//!
//! The content aggregation and ranking pipeline: periodic ingestion from
//! pluggable providers, engagement-driven deterministic scoring, and a
//! ranked, cached search read path.
//!
//! - `fetch`: concurrent, rate-checked, timeout-bounded provider fan-out.
//! - `sync`: the per-provider sync engine and its audit trail.
//! - `score`: persisting scores computed by the pure scoring engine.
//! - `search`: the read path (search, detail, stats).
//! - `jobs`: periodic sync/recalculation jobs and the async job registry.
//! - `admin`: the surface behind the edge's API-key check.
//!
//! Assemble an instance with [`Trove::builder`]: register providers, wire
//! the repositories (the Postgres gateway in production, the in-memory
//! store in tests), and optionally override the rate limiter.
#![warn(missing_docs)]

/// Admin surface.
pub mod admin;
/// Provider fan-out coordinator.
pub mod fetch;
/// Periodic jobs and the async job registry.
pub mod jobs;
/// Process runtime state.
pub mod runtime;
/// Score persistence.
pub mod score;
/// The read path.
pub mod search;
/// The sync engine.
pub mod sync;

pub use admin::{AdminService, RecalcDispatch, RecalcScope, SyncDispatch};
pub use fetch::FetchCoordinator;
pub use jobs::{ContentSyncJob, JobHandle, JobRegistry, ScoreRecalculationJob};
pub use runtime::AppState;
pub use score::ScoreCalculator;
pub use search::{SearchQuery, SearchService};
pub use sync::SyncEngine;

use std::sync::Arc;

use trove_core::{
    ContentMetricsRepository, ContentProvider, ContentRepository, ProviderRegistry, RateLimiter,
    ScoringEngine, SyncHistoryRepository, TroveError,
};
use trove_middleware::{FixedWindowLimiter, SearchCache};
use trove_types::TroveConfig;

/// A fully wired pipeline instance.
pub struct Trove {
    registry: Arc<ProviderRegistry>,
    coordinator: Arc<FetchCoordinator>,
    sync: Arc<SyncEngine>,
    scores: Arc<ScoreCalculator>,
    search: Arc<SearchService>,
    jobs: Arc<JobRegistry>,
    admin: Arc<AdminService>,
    cfg: TroveConfig,
}

/// Builder for a [`Trove`] instance.
pub struct TroveBuilder {
    providers: Vec<Arc<dyn ContentProvider>>,
    limiter: Option<Arc<dyn RateLimiter>>,
    contents: Option<Arc<dyn ContentRepository>>,
    metrics: Option<Arc<dyn ContentMetricsRepository>>,
    history: Option<Arc<dyn SyncHistoryRepository>>,
    cfg: TroveConfig,
}

impl Default for TroveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TroveBuilder {
    /// A builder with default configuration and nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            limiter: None,
            contents: None,
            metrics: None,
            history: None,
            cfg: TroveConfig::default(),
        }
    }

    /// Register a provider adapter. Later registrations with the same
    /// provider id win.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ContentProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Override the rate limiter. Defaults to a fixed-window limiter built
    /// from the configuration.
    #[must_use]
    pub fn limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Wire the content repository.
    #[must_use]
    pub fn content_repository(mut self, repo: Arc<dyn ContentRepository>) -> Self {
        self.contents = Some(repo);
        self
    }

    /// Wire the metrics repository.
    #[must_use]
    pub fn metrics_repository(mut self, repo: Arc<dyn ContentMetricsRepository>) -> Self {
        self.metrics = Some(repo);
        self
    }

    /// Wire the sync-history repository.
    #[must_use]
    pub fn sync_history_repository(mut self, repo: Arc<dyn SyncHistoryRepository>) -> Self {
        self.history = Some(repo);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: TroveConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Assemble the pipeline.
    ///
    /// # Errors
    /// Returns [`TroveError::InvalidArg`] when no provider is registered or
    /// any repository is missing.
    pub fn build(self) -> Result<Trove, TroveError> {
        if self.providers.is_empty() {
            return Err(TroveError::InvalidArg(
                "no providers registered; add at least one via with_provider(...)".into(),
            ));
        }
        let contents = self.contents.ok_or_else(|| {
            TroveError::InvalidArg("content repository is required".into())
        })?;
        let metrics = self.metrics.ok_or_else(|| {
            TroveError::InvalidArg("metrics repository is required".into())
        })?;
        let history = self.history.ok_or_else(|| {
            TroveError::InvalidArg("sync-history repository is required".into())
        })?;

        let cfg = self.cfg;
        let mut registry = ProviderRegistry::new();
        for provider in self.providers {
            registry.register(provider);
        }
        let registry = Arc::new(registry);

        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(FixedWindowLimiter::new(&cfg.rate_limit)));
        let coordinator = Arc::new(FetchCoordinator::new(
            registry.clone(),
            limiter,
            cfg.providers.timeout,
        ));

        let scores = Arc::new(ScoreCalculator::new(
            contents.clone(),
            metrics.clone(),
            ScoringEngine::new(&cfg.scoring),
        ));
        let sync = Arc::new(SyncEngine::new(
            coordinator.clone(),
            registry.clone(),
            contents.clone(),
            metrics.clone(),
            history.clone(),
            scores.clone(),
            cfg.thresholds,
        ));
        let search = Arc::new(SearchService::new(
            contents.clone(),
            history.clone(),
            Arc::new(SearchCache::new(&cfg.search_cache)),
            cfg.pagination,
        ));
        let jobs = Arc::new(JobRegistry::new());
        let admin = Arc::new(AdminService::new(
            sync.clone(),
            scores.clone(),
            registry.clone(),
            contents,
            history,
            jobs.clone(),
            cfg.jobs,
            cfg.recalc.batch_size,
            cfg.providers.timeout,
        ));

        Ok(Trove {
            registry,
            coordinator,
            sync,
            scores,
            search,
            jobs,
            admin,
            cfg,
        })
    }
}

impl Trove {
    /// Start building a pipeline instance.
    #[must_use]
    pub fn builder() -> TroveBuilder {
        TroveBuilder::new()
    }

    /// The provider registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// The fetch coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<FetchCoordinator> {
        &self.coordinator
    }

    /// The sync engine.
    #[must_use]
    pub fn sync_engine(&self) -> &Arc<SyncEngine> {
        &self.sync
    }

    /// The score calculator.
    #[must_use]
    pub fn score_calculator(&self) -> &Arc<ScoreCalculator> {
        &self.scores
    }

    /// The read path.
    #[must_use]
    pub fn search(&self) -> &Arc<SearchService> {
        &self.search
    }

    /// The async job registry.
    #[must_use]
    pub fn jobs(&self) -> &Arc<JobRegistry> {
        &self.jobs
    }

    /// The admin surface.
    #[must_use]
    pub fn admin(&self) -> &Arc<AdminService> {
        &self.admin
    }

    /// The configuration this instance was built with.
    #[must_use]
    pub const fn config(&self) -> &TroveConfig {
        &self.cfg
    }

    /// Start the enabled periodic jobs and return their handles.
    #[must_use]
    pub fn start_jobs(&self) -> Vec<JobHandle> {
        let mut handles = Vec::new();
        if let Some(h) = ContentSyncJob::new(self.sync.clone(), self.cfg.sync).start() {
            handles.push(h);
        }
        if let Some(h) =
            ScoreRecalculationJob::new(self.scores.clone(), self.cfg.recalc).start()
        {
            handles.push(h);
        }
        handles
    }
}
