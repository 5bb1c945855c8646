use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome classification of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The run is open; `completed_at` and `duration_ms` are unset.
    InProgress,
    /// Every fetched item was processed without error.
    Success,
    /// Some items failed but at least one succeeded.
    Partial,
    /// No item succeeded and at least one error occurred.
    Failed,
    /// The run was skipped (e.g. shed by the rate limiter).
    Skipped,
}

impl SyncStatus {
    /// Parse a status filter string, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_progress" => Some(Self::InProgress),
            "success" => Some(Self::Success),
            "partial" => Some(Self::Partial),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Canonical snake_case label, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit row for one sync attempt against one provider.
///
/// Created with [`SyncStatus::InProgress`] when the run opens and updated
/// exactly once when it finishes. `completed_at` and `duration_ms` are set
/// iff the status is no longer in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncHistory {
    /// Store-assigned row id; zero until persisted.
    pub id: i64,
    /// Provider this run targeted.
    pub provider_id: String,
    /// Run outcome.
    pub status: SyncStatus,
    /// Number of items the fetch returned.
    pub total_fetched: i64,
    /// Items inserted as new content.
    pub new_contents: i64,
    /// Items whose metrics changed significantly and were updated.
    pub updated_contents: i64,
    /// Items whose metrics were unchanged.
    pub skipped_contents: i64,
    /// Items that errored during persistence or scoring.
    pub failed_contents: i64,
    /// First error observed during the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished; `None` while in progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock duration in milliseconds; zero while in progress.
    pub duration_ms: i64,
}

impl SyncHistory {
    /// An open audit row for `provider_id` starting at `started_at`.
    #[must_use]
    pub fn open(provider_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            provider_id: provider_id.into(),
            status: SyncStatus::InProgress,
            total_fetched: 0,
            new_contents: 0,
            updated_contents: 0,
            skipped_contents: 0,
            failed_contents: 0,
            error_message: None,
            started_at,
            completed_at: None,
            duration_ms: 0,
        }
    }
}

/// In-memory report for one sync run, returned to admin callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Provider this run targeted.
    pub provider_id: String,
    /// Number of items the fetch returned.
    pub total_fetched: i64,
    /// Items inserted as new content.
    pub new_contents: i64,
    /// Items whose metrics changed significantly and were updated.
    pub updated_contents: i64,
    /// Items whose metrics were unchanged.
    pub skipped_contents: i64,
    /// Items that errored during persistence or scoring.
    pub failed_contents: i64,
    /// All errors observed during the run, in encounter order.
    pub errors: Vec<String>,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// When the run started.
    pub synced_at: DateTime<Utc>,
}

impl SyncResult {
    /// An empty result for a run starting at `synced_at`.
    #[must_use]
    pub fn new(provider_id: impl Into<String>, synced_at: DateTime<Utc>) -> Self {
        Self {
            provider_id: provider_id.into(),
            total_fetched: 0,
            new_contents: 0,
            updated_contents: 0,
            skipped_contents: 0,
            failed_contents: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
            synced_at,
        }
    }

    /// Classify this run for the audit row: success without errors, partial
    /// when errors occurred but some item succeeded, failed otherwise.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        if self.errors.is_empty() {
            SyncStatus::Success
        } else if self.new_contents + self.updated_contents + self.skipped_contents > 0 {
            SyncStatus::Partial
        } else {
            SyncStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_status_classification() {
        let mut r = SyncResult::new("p1", Utc::now());
        assert_eq!(r.status(), SyncStatus::Success);

        r.errors.push("boom".into());
        assert_eq!(r.status(), SyncStatus::Failed);

        r.skipped_contents = 1;
        assert_eq!(r.status(), SyncStatus::Partial);
    }

    #[test]
    fn open_history_has_no_completion() {
        let h = SyncHistory::open("p1", Utc::now());
        assert_eq!(h.status, SyncStatus::InProgress);
        assert!(h.completed_at.is_none());
        assert_eq!(h.duration_ms, 0);
    }
}
