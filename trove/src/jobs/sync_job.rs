use std::sync::Arc;

use tracing::{error, info, warn};

use super::JobHandle;
use crate::sync::SyncEngine;
use trove_types::{SyncJobConfig, SyncStatus};

/// Periodic full-sync runner.
///
/// Fires once immediately on start and then every `interval`. Each firing
/// runs `sync_all` with up to `retry_count` whole-run retries separated by
/// `retry_delay`. A mutex makes each firing single-flight: a tick arriving
/// while the previous run is still in flight is dropped with a warning, not
/// queued.
pub struct ContentSyncJob {
    engine: Arc<SyncEngine>,
    cfg: SyncJobConfig,
    gate: tokio::sync::Mutex<()>,
}

impl ContentSyncJob {
    /// Build the job; nothing runs until [`start`](Self::start).
    #[must_use]
    pub fn new(engine: Arc<SyncEngine>, cfg: SyncJobConfig) -> Self {
        Self {
            engine,
            cfg,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Spawn the ticker task. Returns `None` when the job is disabled.
    #[must_use]
    pub fn start(self) -> Option<JobHandle> {
        if !self.cfg.enabled {
            return None;
        }
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();
        let job = Arc::new(self);

        let handle = tokio::spawn(async move {
            info!(interval = ?job.cfg.interval, "content sync job started");
            // First run fires immediately so data is ingested without
            // waiting out the first interval.
            job.run_once().await;

            let mut ticker = tokio::time::interval(job.cfg.interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => job.run_once().await,
                    _ = &mut stop_rx => break,
                }
            }
            info!("content sync job stopped");
        });
        Some(JobHandle::new(handle, stop_tx))
    }

    /// Run one firing: `sync_all` plus the configured whole-run retries.
    /// Skips (with a warning) when a previous firing is still in flight.
    pub async fn run_once(&self) {
        let Ok(_guard) = self.gate.try_lock() else {
            warn!("content sync already running; skipping tick");
            return;
        };

        let mut attempt = 0u32;
        loop {
            let results = self.engine.sync_all().await;
            let whole_run_failed =
                !results.is_empty() && results.iter().all(|r| r.status() == SyncStatus::Failed);
            if !whole_run_failed {
                return;
            }

            attempt += 1;
            if attempt > self.cfg.retry_count {
                error!(attempts = attempt, "content sync failed after retries");
                return;
            }
            warn!(attempt, "content sync attempt failed; retrying");
            tokio::time::sleep(self.cfg.retry_delay).await;
        }
    }
}
