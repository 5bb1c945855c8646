//! Periodic jobs and the in-process async job registry.
//!
//! Both periodic jobs spawn one tokio task driven by a ticker and a oneshot
//! stop channel, returned to the caller as a [`JobHandle`].

/// The score recalculation job.
pub mod recalc_job;
/// The job registry for admin-triggered async work.
pub mod registry;
/// The content sync job.
pub mod sync_job;

pub use recalc_job::ScoreRecalculationJob;
pub use registry::JobRegistry;
pub use sync_job::ContentSyncJob;

/// Handle to a spawned periodic job.
///
/// Lifecycle contract:
/// - Prefer [`stop`](JobHandle::stop) to request a graceful shutdown: the
///   stop signal is sent, the in-flight run (if any) drains, and the task
///   is awaited. Stopping twice is impossible by construction (`stop`
///   consumes the handle), and a stop after the task already exited is a
///   no-op.
/// - [`abort`](JobHandle::abort) force-cancels without draining.
/// - Dropping the handle sends a best-effort stop signal and then aborts;
///   the task may not observe the signal before the abort lands.
#[derive(Debug)]
pub struct JobHandle {
    inner: Option<tokio::task::JoinHandle<()>>,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl JobHandle {
    pub(crate) const fn new(
        inner: tokio::task::JoinHandle<()>,
        stop_tx: tokio::sync::oneshot::Sender<()>,
    ) -> Self {
        Self {
            inner: Some(inner),
            stop_tx: Some(stop_tx),
        }
    }

    /// Gracefully stop the job task and await its completion, draining any
    /// in-flight run.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(inner) = self.inner.take() {
            let _ = inner.await;
        }
    }

    /// Force-abort the job task without waiting for the in-flight run.
    pub fn abort(mut self) {
        if let Some(inner) = self.inner.take() {
            inner.abort();
        }
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(inner) = self.inner.take() {
            inner.abort();
        }
    }
}
