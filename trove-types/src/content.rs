use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::ContentMetrics;

/// Kind of a normalized content item.
///
/// Upstream feeds use a wider vocabulary ("article", free-form strings);
/// adapters collapse everything that is not a video into [`ContentType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Video content, scored on views and likes.
    Video,
    /// Textual content, scored on reading time and reactions.
    Text,
}

impl ContentType {
    /// Parse a user-supplied type string, case-insensitively.
    ///
    /// Returns `None` for anything other than `"video"` or `"text"`; callers
    /// decide whether that is an error or a missing filter.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Some(Self::Video),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// Canonical lowercase label, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized, addressable item originating from one provider.
///
/// Identity is the `(provider_id, provider_content_id)` pair, which is unique
/// across live and soft-deleted rows. The numeric `id` is assigned by the
/// store on insert and is the public handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Store-assigned numeric id; the public handle.
    pub id: i64,
    /// Id of the provider this content originated from.
    pub provider_id: String,
    /// The provider's own id for this item.
    pub provider_content_id: String,
    /// Non-empty display title.
    pub title: String,
    /// Content kind.
    pub content_type: ContentType,
    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional canonical URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Optional thumbnail URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Publication time as reported upstream, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last row update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion marker; a content is live iff this is `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Content {
    /// Whether this content is visible to the read path.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// A content row joined with its metrics row, as returned by search and
/// detail queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentWithMetrics {
    /// The content row.
    pub content: Content,
    /// Its one-to-one metrics row.
    pub metrics: ContentMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parses_case_insensitively() {
        assert_eq!(ContentType::parse("Video"), Some(ContentType::Video));
        assert_eq!(ContentType::parse(" TEXT "), Some(ContentType::Text));
        assert_eq!(ContentType::parse("article"), None);
        assert_eq!(ContentType::parse(""), None);
    }

    #[test]
    fn content_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ContentType::Video).unwrap(),
            "\"video\""
        );
    }
}
