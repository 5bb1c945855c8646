use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentType;
use crate::sync::SyncStatus;

/// Sort order for search results.
///
/// Score sorts break ties by text relevance descending; date sorts break
/// ties by relevance as well, with nulls last on the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSort {
    /// Highest final score first (the default).
    #[default]
    ScoreDesc,
    /// Lowest final score first.
    ScoreAsc,
    /// Most recently published first.
    DateDesc,
    /// Oldest published first.
    DateAsc,
}

impl SearchSort {
    /// Parse a sort string; unknown values fall back to the default rather
    /// than erroring.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "score_asc" => Self::ScoreAsc,
            "date_desc" => Self::DateDesc,
            "date_asc" => Self::DateAsc,
            _ => Self::ScoreDesc,
        }
    }

    /// Canonical snake_case label, used in cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScoreDesc => "score_desc",
            Self::ScoreAsc => "score_asc",
            Self::DateDesc => "date_desc",
            Self::DateAsc => "date_asc",
        }
    }
}

/// One page of a paginated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl Pagination {
    /// Build a pagination, as supplied by the caller.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Normalize out-of-range values: page 0 becomes 1, a page size of zero
    /// or above `max_page_size` becomes `default_page_size`.
    #[must_use]
    pub const fn normalized(self, default_page_size: u32, max_page_size: u32) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        let page_size = if self.page_size == 0 || self.page_size > max_page_size {
            default_page_size
        } else {
            self.page_size
        };
        Self { page, page_size }
    }

    /// Row offset of this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.page_size as u64
    }
}

/// A content row shaped for result lists. Descriptions are truncated to 200
/// characters by the search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSummary {
    /// Public content id.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Content kind.
    pub content_type: ContentType,
    /// Truncated description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Thumbnail URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Current final score.
    pub score: f64,
    /// Publication time, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Originating provider id.
    pub provider: String,
}

/// Engagement metrics shaped for the detail view. Zero axes are suppressed
/// to distinguish "zero" from "not applicable"; the stored zero remains
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsDetail {
    /// View count, absent when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
    /// Like count, absent when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    /// Reading time in minutes, absent when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<i32>,
    /// Reaction count, absent when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<i32>,
    /// When the score was last (re)computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalculated_at: Option<DateTime<Utc>>,
}

/// Full detail view of one content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDetail {
    /// The summary fields, with the full (untruncated) description.
    #[serde(flatten)]
    pub summary: ContentSummary,
    /// Zero-suppressed engagement metrics.
    pub metrics: MetricsDetail,
}

/// One page of search results plus the total count of the unpaginated match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// The requested slice of results.
    pub items: Vec<ContentSummary>,
    /// Total matching rows before pagination.
    pub total: i64,
}

/// Per-provider slice of the aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    /// Provider id.
    pub provider_id: String,
    /// Live contents originating from this provider.
    pub content_count: i64,
    /// Completion time of the provider's most recent finished sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

/// Aggregate corpus statistics for the read API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total live contents.
    pub total_contents: i64,
    /// Live video contents.
    pub total_videos: i64,
    /// Live text contents.
    pub total_texts: i64,
    /// Average final score across live contents, two-decimal precision.
    pub average_score: f64,
    /// Most recent sync completion across all providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    /// Per-provider breakdown.
    pub providers: Vec<ProviderStats>,
}

/// Per-provider overview row for the admin surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOverview {
    /// Provider id.
    pub provider_id: String,
    /// Live contents originating from this provider.
    pub content_count: i64,
    /// Average final score of this provider's contents.
    pub average_score: f64,
    /// Completion time of the most recent finished sync, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    /// Status of that sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_status: Option<SyncStatus>,
}

/// Result of probing one provider's endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Provider id.
    pub provider_id: String,
    /// Whether the probe succeeded.
    pub healthy: bool,
    /// Probe latency in milliseconds.
    pub response_time_ms: u64,
    /// Probe failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the probe ran.
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_normalizes_out_of_range_values() {
        let p = Pagination::new(0, 0).normalized(20, 100);
        assert_eq!(p, Pagination::new(1, 20));

        let p = Pagination::new(3, 500).normalized(20, 100);
        assert_eq!(p, Pagination::new(3, 20));

        let p = Pagination::new(2, 10).normalized(20, 100);
        assert_eq!(p, Pagination::new(2, 10));
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn unknown_sort_falls_back_to_default() {
        assert_eq!(SearchSort::parse("relevance"), SearchSort::ScoreDesc);
        assert_eq!(SearchSort::parse("date_asc"), SearchSort::DateAsc);
        assert_eq!(SearchSort::parse(""), SearchSort::ScoreDesc);
    }
}
