use std::sync::Arc;

use tracing::{error, info};

use super::JobHandle;
use crate::score::ScoreCalculator;
use trove_types::RecalcJobConfig;

/// Periodic full-corpus score recalculation.
///
/// Fires every `interval` (no immediate run on start) and walks all live
/// content ids in `batch_size` chunks. Per-item errors are logged inside the
/// calculator and do not abort the walk. There is no inner single-flight:
/// the interval must not be configured shorter than a typical walk.
pub struct ScoreRecalculationJob {
    calculator: Arc<ScoreCalculator>,
    cfg: RecalcJobConfig,
}

impl ScoreRecalculationJob {
    /// Build the job; nothing runs until [`start`](Self::start).
    #[must_use]
    pub const fn new(calculator: Arc<ScoreCalculator>, cfg: RecalcJobConfig) -> Self {
        Self { calculator, cfg }
    }

    /// Spawn the ticker task. Returns `None` when the job is disabled.
    #[must_use]
    pub fn start(self) -> Option<JobHandle> {
        if !self.cfg.enabled {
            return None;
        }
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            info!(interval = ?self.cfg.interval, "score recalculation job started");
            let mut ticker = tokio::time::interval(self.cfg.interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_once().await,
                    _ = &mut stop_rx => break,
                }
            }
            info!("score recalculation job stopped");
        });
        Some(JobHandle::new(handle, stop_tx))
    }

    /// Run one full walk.
    pub async fn run_once(&self) {
        match self.calculator.recalculate_all(self.cfg.batch_size).await {
            Ok(processed) => info!(processed, "score recalculation pass completed"),
            Err(e) => error!(error = %e, "score recalculation pass failed"),
        }
    }
}
