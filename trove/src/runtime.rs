use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::jobs::JobHandle;

/// Process-wide runtime state: the start time reported by health
/// collaborators and the handles of the started periodic jobs.
///
/// Shutdown is explicit and idempotent: each tracked job's ticker is
/// stopped and its in-flight run drained exactly once.
pub struct AppState {
    started: Instant,
    started_at: DateTime<Utc>,
    handles: Mutex<Vec<JobHandle>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Capture the process start time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Wall-clock time the process started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time elapsed since start.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Track a started periodic job for shutdown.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn track(&self, handle: JobHandle) {
        self.handles.lock().expect("mutex poisoned").push(handle);
    }

    /// Stop every tracked job, draining in-flight runs. Subsequent calls
    /// are no-ops.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub async fn shutdown(&self) {
        let handles: Vec<JobHandle> =
            std::mem::take(&mut *self.handles.lock().expect("mutex poisoned"));
        if handles.is_empty() {
            return;
        }
        info!(jobs = handles.len(), "stopping periodic jobs");
        for handle in handles {
            handle.stop().await;
        }
    }
}
