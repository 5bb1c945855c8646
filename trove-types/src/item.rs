use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentType;

/// An item as normalized by a provider adapter, before persistence.
///
/// Engagement axes are `None` when the upstream did not report them; a
/// reported zero is preserved as `Some(0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderItem {
    /// Id of the adapter that produced this item.
    pub provider_id: String,
    /// The provider's own id for this item. Required; adapters fail the
    /// whole batch when an upstream item lacks it.
    pub provider_content_id: String,
    /// Display title.
    pub title: String,
    /// Content kind after upstream-vocabulary mapping.
    pub content_type: ContentType,
    /// Optional description.
    pub description: Option<String>,
    /// Optional canonical URL.
    pub url: Option<String>,
    /// Optional thumbnail URL.
    pub thumbnail_url: Option<String>,
    /// Publication time, if the upstream reported one.
    pub published_at: Option<DateTime<Utc>>,
    /// View count, if reported.
    pub views: Option<i64>,
    /// Like count, if reported.
    pub likes: Option<i64>,
    /// Reading time in minutes, if reported.
    pub reading_time: Option<i32>,
    /// Reaction count, if reported.
    pub reactions: Option<i32>,
}

impl ProviderItem {
    /// A bare item with the given identity, title, and kind; everything else
    /// unset. Handy for adapters and tests.
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        provider_content_id: impl Into<String>,
        title: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_content_id: provider_content_id.into(),
            title: title.into(),
            content_type,
            description: None,
            url: None,
            thumbnail_url: None,
            published_at: None,
            views: None,
            likes: None,
            reading_time: None,
            reactions: None,
        }
    }
}
