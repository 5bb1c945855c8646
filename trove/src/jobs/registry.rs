use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use trove_types::{JobInfo, JobStatus};

/// In-process catalogue of admin-triggered async jobs.
///
/// All operations take one lock, so concurrent callers observe consistent
/// snapshots and status transitions are linearizable per job id. The
/// registry is process-local and non-persistent; ids embed a UUID and are
/// unique across the process lifetime.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, JobInfo>>,
}

impl JobRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending job of the given kind and return its record.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn create(&self, kind: &str) -> JobInfo {
        let info = JobInfo {
            id: format!("{kind}-{}", uuid::Uuid::new_v4()),
            kind: kind.to_string(),
            status: JobStatus::Pending,
            progress: 0,
            started_at: Utc::now(),
            ended_at: None,
            error: None,
        };
        self.jobs
            .lock()
            .expect("mutex poisoned")
            .insert(info.id.clone(), info.clone());
        info
    }

    /// Update a job's status and progress. A terminal status also stamps
    /// `ended_at` and records the error. Unknown ids are ignored.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn update(&self, id: &str, status: JobStatus, progress: u8, error: Option<String>) {
        let mut jobs = self.jobs.lock().expect("mutex poisoned");
        if let Some(job) = jobs.get_mut(id) {
            job.status = status;
            job.progress = progress;
            if status.is_terminal() {
                job.ended_at = Some(Utc::now());
                job.error = error;
            }
        }
    }

    /// Snapshot of one job's record.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<JobInfo> {
        self.jobs.lock().expect("mutex poisoned").get(id).cloned()
    }
}
