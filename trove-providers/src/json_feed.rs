use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use trove_core::{ContentProvider, RateLimit, TroveError};
use trove_types::{ContentType, ProviderItem};

const PROVIDER_ID: &str = "provider1";

/// Adapter for the paginated JSON feed upstream.
///
/// Fetches `GET {base}/contents?limit=&offset=` and normalizes the feed's
/// item shape. Upstream "video" maps to [`ContentType::Video`]; "article"
/// and anything else map to [`ContentType::Text`]. This feed serializes
/// metrics with omit-when-zero semantics, so zero-valued numeric metrics
/// are treated as not reported.
#[derive(Debug)]
pub struct JsonFeedProvider {
    client: reqwest::Client,
    base_url: String,
    limit: u32,
    offset: u32,
}

impl JsonFeedProvider {
    /// Build an adapter for `base_url` with the given HTTP timeout and the
    /// default page window (limit 40, offset 0).
    ///
    /// # Panics
    /// Panics if the underlying HTTP client cannot be constructed, which is
    /// unexpected in normal environments.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client for JsonFeedProvider");
        Self {
            client,
            base_url: base_url.into(),
            limit: 40,
            offset: 0,
        }
    }

    /// Override the requested page window.
    #[must_use]
    pub const fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    contents: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    metrics: FeedMetrics,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedMetrics {
    #[serde(default)]
    views: i64,
    #[serde(default)]
    likes: i64,
    #[serde(default)]
    reactions: i32,
}

#[async_trait]
impl ContentProvider for JsonFeedProvider {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(100)
    }

    async fn fetch_contents(&self) -> Result<Vec<ProviderItem>, TroveError> {
        let url = format!("{}/contents", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("limit", self.limit), ("offset", self.offset)])
            .send()
            .await
            .map_err(|e| TroveError::provider(PROVIDER_ID, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TroveError::provider(
                PROVIDER_ID,
                format!("status {} from upstream", status.as_u16()),
            ));
        }

        let feed: FeedResponse = resp
            .json()
            .await
            .map_err(|e| TroveError::provider(PROVIDER_ID, format!("decode failed: {e}")))?;

        let mut out = Vec::with_capacity(feed.contents.len());
        for raw in feed.contents {
            if raw.id.is_empty() {
                return Err(TroveError::Data(format!(
                    "{PROVIDER_ID} item missing id (title: {:?})",
                    raw.title
                )));
            }

            let published_at = raw
                .published_at
                .as_deref()
                .map(|s| crate::parse_published(PROVIDER_ID, s));

            let mut item = ProviderItem::new(PROVIDER_ID, &raw.id, &raw.title, ContentType::Text);
            item.published_at = published_at;

            match raw.kind.as_str() {
                "video" => {
                    item.content_type = ContentType::Video;
                    item.url = Some(format!("https://example.com/video/{}", raw.id));
                    item.thumbnail_url = Some(format!("https://example.com/thumb/{}.jpg", raw.id));
                    if raw.metrics.views != 0 {
                        item.views = Some(raw.metrics.views);
                    }
                    if raw.metrics.likes != 0 {
                        item.likes = Some(raw.metrics.likes);
                    }
                }
                "article" => {
                    item.url = Some(format!("https://example.com/article/{}", raw.id));
                    if raw.metrics.reactions != 0 {
                        item.reactions = Some(raw.metrics.reactions);
                    }
                    // This feed carries no reading time; assume a short read.
                    item.reading_time = Some(5);
                }
                _ => {
                    item.url = Some(format!("https://example.com/content/{}", raw.id));
                }
            }
            out.push(item);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    const FEED_BODY: &str = r#"{
        "contents": [
            {
                "id": "v1",
                "title": "Rust Programming Tutorial",
                "type": "video",
                "metrics": {"views": 15000, "likes": 1200, "duration": "15:30"},
                "published_at": "2024-03-15T10:00:00Z",
                "tags": ["programming", "tutorial"]
            },
            {
                "id": "a1",
                "title": "Clean Code Article",
                "type": "article",
                "metrics": {"reactions": 450},
                "published_at": "2024-03-14"
            }
        ],
        "pagination": {"total": 150, "page": 1, "per_page": 10}
    }"#;

    #[tokio::test]
    async fn fetch_normalizes_videos_and_articles() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/contents")
                    .query_param("limit", "40")
                    .query_param("offset", "0");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(FEED_BODY);
            })
            .await;

        let p = JsonFeedProvider::new(server.base_url(), Duration::from_secs(2));
        let items = p.fetch_contents().await.unwrap();
        mock.assert_async().await;

        assert_eq!(items.len(), 2);

        let video = &items[0];
        assert_eq!(video.content_type, ContentType::Video);
        assert_eq!(video.title, "Rust Programming Tutorial");
        assert_eq!(video.views, Some(15_000));
        assert_eq!(video.likes, Some(1_200));
        assert_eq!(video.reading_time, None);
        assert_eq!(
            video.url.as_deref(),
            Some("https://example.com/video/v1")
        );

        let article = &items[1];
        assert_eq!(article.content_type, ContentType::Text);
        assert_eq!(article.reactions, Some(450));
        assert_eq!(article.reading_time, Some(5));
        assert_eq!(article.views, None);
        // plain-date form parses to midnight UTC
        assert_eq!(
            article.published_at.unwrap().to_rfc3339(),
            "2024-03-14T00:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn non_2xx_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/contents");
                then.status(500);
            })
            .await;

        let p = JsonFeedProvider::new(server.base_url(), Duration::from_secs(2));
        let err = p.fetch_contents().await.unwrap_err();
        assert!(matches!(err, TroveError::Provider { .. }), "got {err}");
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/contents");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"contents":[{"id":"#);
            })
            .await;

        let p = JsonFeedProvider::new(server.base_url(), Duration::from_secs(2));
        assert!(p.fetch_contents().await.is_err());
    }

    #[tokio::test]
    async fn item_without_id_fails_the_whole_batch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/contents");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"contents":[{"id":"ok","title":"a","type":"video"},{"title":"no id","type":"article"}]}"#);
            })
            .await;

        let p = JsonFeedProvider::new(server.base_url(), Duration::from_secs(2));
        let err = p.fetch_contents().await.unwrap_err();
        assert!(matches!(err, TroveError::Data(_)), "got {err}");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/contents");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"contents":[]}"#)
                    .delay(Duration::from_millis(500));
            })
            .await;

        let p = JsonFeedProvider::new(server.base_url(), Duration::from_millis(50));
        let err = p.fetch_contents().await.unwrap_err();
        assert!(matches!(err, TroveError::Provider { .. }), "got {err}");
    }
}
