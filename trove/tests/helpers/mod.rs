#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as Days, Utc};

use trove::Trove;
use trove_mock::{MemoryStore, MockProvider};
use trove_types::{ContentType, ProviderItem, TroveConfig};

/// A video item published `days_ago` days before now.
pub fn video_item(
    provider: &str,
    id: &str,
    title: &str,
    views: i64,
    likes: i64,
    days_ago: i64,
) -> ProviderItem {
    let mut item = ProviderItem::new(provider, id, title, ContentType::Video);
    item.views = Some(views);
    item.likes = Some(likes);
    item.published_at = Some(Utc::now() - Days::days(days_ago));
    item.url = Some(format!("https://example.com/video/{id}"));
    item
}

/// A text item published `days_ago` days before now.
pub fn text_item(
    provider: &str,
    id: &str,
    title: &str,
    reading_time: i32,
    reactions: i32,
    days_ago: i64,
) -> ProviderItem {
    let mut item = ProviderItem::new(provider, id, title, ContentType::Text);
    item.reading_time = Some(reading_time);
    item.reactions = Some(reactions);
    item.published_at = Some(Utc::now() - Days::days(days_ago));
    item.url = Some(format!("https://example.com/article/{id}"));
    item
}

/// Default config with a short provider timeout so tests fail fast.
pub fn test_config() -> TroveConfig {
    let mut cfg = TroveConfig::default();
    cfg.providers.timeout = Duration::from_secs(1);
    cfg
}

/// Best-effort logging so failing tests show the pipeline's tracing output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Assemble a pipeline over an in-memory store and the given providers.
pub fn build_trove(
    providers: Vec<Arc<MockProvider>>,
    cfg: TroveConfig,
) -> (Trove, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let mut builder = Trove::builder()
        .content_repository(store.clone())
        .metrics_repository(store.clone())
        .sync_history_repository(store.clone())
        .config(cfg);
    for provider in providers {
        builder = builder.with_provider(provider);
    }
    (builder.build().expect("trove builds"), store)
}
