use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use trove_core::{ContentProvider, RateLimit, TroveError};
use trove_types::{ContentType, ProviderItem};

const PROVIDER_ID: &str = "provider2";

/// Adapter for the XML feed upstream.
///
/// Fetches `GET {base}/feed?page=&size=` and decodes the
/// `<feed><items><item>...` document via quick-xml. The type mapping
/// matches the JSON adapter; optional `<stats>` fields pass through as
/// reported, including explicit zeros.
#[derive(Debug)]
pub struct XmlFeedProvider {
    client: reqwest::Client,
    base_url: String,
    page: u32,
    size: u32,
}

impl XmlFeedProvider {
    /// Build an adapter for `base_url` with the given HTTP timeout and the
    /// default page window (page 1, size 40).
    ///
    /// # Panics
    /// Panics if the underlying HTTP client cannot be constructed, which is
    /// unexpected in normal environments.
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client for XmlFeedProvider");
        Self {
            client,
            base_url: base_url.into(),
            page: 1,
            size: 40,
        }
    }

    /// Override the requested page window.
    #[must_use]
    pub const fn with_page(mut self, page: u32, size: u32) -> Self {
        self.page = page;
        self.size = size;
        self
    }
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    items: Items,
}

#[derive(Debug, Default, Deserialize)]
struct Items {
    #[serde(default, rename = "item")]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    id: String,
    #[serde(default)]
    headline: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    stats: Stats,
    #[serde(default)]
    publication_date: String,
}

#[derive(Debug, Default, Deserialize)]
struct Stats {
    views: Option<i64>,
    likes: Option<i64>,
    reading_time: Option<i32>,
    reactions: Option<i32>,
}

#[async_trait]
impl ContentProvider for XmlFeedProvider {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(80)
    }

    async fn fetch_contents(&self) -> Result<Vec<ProviderItem>, TroveError> {
        let url = format!("{}/feed", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("page", self.page), ("size", self.size)])
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

        let body = resp
            .text()
            .await
            .map_err(|e| TroveError::provider(PROVIDER_ID, e.to_string()))?;
        let feed: Feed = quick_xml::de::from_str(&body)
            .map_err(|e| TroveError::provider(PROVIDER_ID, format!("decode failed: {e}")))?;

        let mut out = Vec::with_capacity(feed.items.item.len());
        for raw in feed.items.item {
            if raw.id.is_empty() {
                return Err(TroveError::Data(format!(
                    "{PROVIDER_ID} item missing id (headline: {:?})",
                    raw.headline
                )));
            }

            let mut item =
                ProviderItem::new(PROVIDER_ID, &raw.id, &raw.headline, ContentType::Text);
            item.published_at = Some(crate::parse_published(PROVIDER_ID, &raw.publication_date));

            match raw.kind.as_str() {
                "video" => {
                    item.content_type = ContentType::Video;
                    item.url = Some(format!("https://example.com/video/{}", raw.id));
                    item.thumbnail_url = Some(format!("https://example.com/thumb/{}.jpg", raw.id));
                    item.views = raw.stats.views;
                    item.likes = raw.stats.likes;
                }
                "article" => {
                    item.url = Some(format!("https://example.com/article/{}", raw.id));
                    item.reading_time = raw.stats.reading_time;
                    item.reactions = raw.stats.reactions;
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

    const FEED_BODY: &str = r"<feed>
        <items>
            <item>
                <id>x1</id>
                <headline>Async Rust Deep Dive</headline>
                <type>video</type>
                <stats>
                    <views>8000</views>
                    <likes>640</likes>
                    <duration>22:10</duration>
                </stats>
                <publication_date>2024-02-01T09:30:00Z</publication_date>
            </item>
            <item>
                <id>x2</id>
                <headline>Ownership Explained</headline>
                <type>article</type>
                <stats>
                    <reading_time>12</reading_time>
                    <reactions>0</reactions>
                </stats>
                <publication_date>2024-01-20</publication_date>
            </item>
        </items>
    </feed>";

    #[tokio::test]
    async fn fetch_decodes_the_feed_document() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/feed")
                    .query_param("page", "1")
                    .query_param("size", "40");
                then.status(200)
                    .header("content-type", "application/xml")
                    .body(FEED_BODY);
            })
            .await;

        let p = XmlFeedProvider::new(server.base_url(), Duration::from_secs(2));
        let items = p.fetch_contents().await.unwrap();
        mock.assert_async().await;

        assert_eq!(items.len(), 2);

        let video = &items[0];
        assert_eq!(video.content_type, ContentType::Video);
        assert_eq!(video.title, "Async Rust Deep Dive");
        assert_eq!(video.views, Some(8_000));
        assert_eq!(video.likes, Some(640));

        let article = &items[1];
        assert_eq!(article.content_type, ContentType::Text);
        assert_eq!(article.reading_time, Some(12));
        // explicit zero is preserved, not dropped
        assert_eq!(article.reactions, Some(0));
        assert_eq!(
            article.published_at.unwrap().to_rfc3339(),
            "2024-01-20T00:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn unparseable_publication_date_substitutes_now() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/feed");
                then.status(200).header("content-type", "application/xml").body(
                    r"<feed><items><item><id>x9</id><headline>h</headline><type>article</type><publication_date>soon</publication_date></item></items></feed>",
                );
            })
            .await;

        let before = chrono::Utc::now();
        let p = XmlFeedProvider::new(server.base_url(), Duration::from_secs(2));
        let items = p.fetch_contents().await.unwrap();

        let ts = items[0].published_at.unwrap();
        assert!(ts >= before && ts <= chrono::Utc::now());
    }

    #[tokio::test]
    async fn non_2xx_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/feed");
                then.status(503);
            })
            .await;

        let p = XmlFeedProvider::new(server.base_url(), Duration::from_secs(2));
        assert!(p.fetch_contents().await.is_err());
    }

    #[tokio::test]
    async fn malformed_document_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/feed");
                then.status(200)
                    .header("content-type", "application/xml")
                    .body("<feed><items><item><id>");
            })
            .await;

        let p = XmlFeedProvider::new(server.base_url(), Duration::from_secs(2));
        let err = p.fetch_contents().await.unwrap_err();
        assert!(matches!(err, TroveError::Provider { .. }), "got {err}");
    }

    #[tokio::test]
    async fn item_without_id_fails_the_whole_batch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/feed");
                then.status(200).header("content-type", "application/xml").body(
                    r"<feed><items><item><headline>anonymous</headline><type>video</type><publication_date>2024-01-01</publication_date></item></items></feed>",
                );
            })
            .await;

        let p = XmlFeedProvider::new(server.base_url(), Duration::from_secs(2));
        let err = p.fetch_contents().await.unwrap_err();
        assert!(matches!(err, TroveError::Data(_)), "got {err}");
    }
}
