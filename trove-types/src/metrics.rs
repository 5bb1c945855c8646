use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::ProviderItem;

/// Engagement metrics for one content, one-to-one with [`crate::Content`].
///
/// `views`/`likes` are the video axes, `reading_time` (minutes) and
/// `reactions` the text axes. A live content has exactly one metrics row
/// after its first sync; the row is deleted together with its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetrics {
    /// Store-assigned row id.
    pub id: i64,
    /// Owning content id.
    pub content_id: i64,
    /// View count, non-negative.
    pub views: i64,
    /// Like count, non-negative.
    pub likes: i64,
    /// Reading time in minutes, non-negative.
    pub reading_time: i32,
    /// Reaction count, non-negative.
    pub reactions: i32,
    /// Deterministic ranking score, non-negative, two-decimal precision.
    pub final_score: f64,
    /// When the score was last (re)computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalculated_at: Option<DateTime<Utc>>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last row update time.
    pub updated_at: DateTime<Utc>,
}

/// A point-in-time view of the four engagement axes, used by the change
/// detector. Absent axes are represented as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    /// View count.
    pub views: i64,
    /// Like count.
    pub likes: i64,
    /// Reading time in minutes.
    pub reading_time: i32,
    /// Reaction count.
    pub reactions: i32,
}

impl From<&ContentMetrics> for EngagementSnapshot {
    fn from(m: &ContentMetrics) -> Self {
        Self {
            views: m.views,
            likes: m.likes,
            reading_time: m.reading_time,
            reactions: m.reactions,
        }
    }
}

impl From<&ProviderItem> for EngagementSnapshot {
    fn from(item: &ProviderItem) -> Self {
        Self {
            views: item.views.unwrap_or(0),
            likes: item.likes.unwrap_or(0),
            reading_time: item.reading_time.unwrap_or(0),
            reactions: item.reactions.unwrap_or(0),
        }
    }
}

impl EngagementSnapshot {
    /// Copy this snapshot's axes into an existing metrics row, leaving score
    /// and bookkeeping fields untouched.
    pub const fn apply_to(&self, metrics: &mut ContentMetrics) {
        metrics.views = self.views;
        metrics.likes = self.likes;
        metrics.reading_time = self.reading_time;
        metrics.reactions = self.reactions;
    }
}
