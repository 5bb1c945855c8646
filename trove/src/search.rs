use std::sync::Arc;

use tracing::warn;

use trove_core::{ContentRepository, SyncHistoryRepository, TroveError, round2};
use trove_middleware::SearchCache;
use trove_types::{
    ContentDetail, ContentSummary, ContentType, ContentWithMetrics, MetricsDetail, Pagination,
    PaginationConfig, ProviderStats, SearchPage, SearchSort, StatsSnapshot,
};

/// Maximum description length in result summaries, in characters.
const SUMMARY_DESCRIPTION_CHARS: usize = 200;

/// Raw search inputs as they arrive from the edge, before normalization.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Keyword; whitespace-only behaves as empty (match all).
    pub keyword: String,
    /// Type filter; invalid values are an error, absence means no filter.
    pub content_type: Option<String>,
    /// Sort order; unknown values fall back to score-descending.
    pub sort: Option<String>,
    /// 1-based page; 0 normalizes to 1.
    pub page: u32,
    /// Page size; 0 or out-of-range normalizes to the configured default.
    pub page_size: u32,
}

/// The read path: ranked search, detail lookup, and aggregate statistics,
/// with a read-through cache in front of search.
pub struct SearchService {
    contents: Arc<dyn ContentRepository>,
    history: Arc<dyn SyncHistoryRepository>,
    cache: Arc<SearchCache>,
    pagination: PaginationConfig,
}

impl SearchService {
    /// Build the read path over the given repositories and cache.
    #[must_use]
    pub fn new(
        contents: Arc<dyn ContentRepository>,
        history: Arc<dyn SyncHistoryRepository>,
        cache: Arc<SearchCache>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            contents,
            history,
            cache,
            pagination,
        }
    }

    /// Normalize the query, consult the cache, and fall through to the
    /// store. A hit returns the same items and total as a bypass for the
    /// same normalized key; cache failures are invisible here because the
    /// cache layer swallows them.
    ///
    /// # Errors
    /// Returns [`TroveError::InvalidArg`] for an invalid content type and
    /// propagates store failures.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage, TroveError> {
        let keyword = query.keyword.trim();

        let content_type = match query
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(raw) => Some(ContentType::parse(raw).ok_or_else(|| {
                TroveError::InvalidArg(format!("invalid content type: {raw}"))
            })?),
            None => None,
        };
        let sort = query.sort.as_deref().map_or_else(SearchSort::default, SearchSort::parse);
        let pagination = Pagination::new(query.page, query.page_size).normalized(
            self.pagination.default_page_size,
            self.pagination.max_page_size,
        );

        let cache_key = format!(
            "sc:{}|{}|{}|{}|{}",
            keyword.to_lowercase(),
            content_type.map_or("", ContentType::as_str),
            sort.as_str(),
            pagination.page,
            pagination.page_size,
        );
        if let Some(hit) = self.cache.get(&cache_key).await {
            return Ok((*hit).clone());
        }

        let (rows, total) = self
            .contents
            .search_with_filters(keyword, content_type, pagination, sort)
            .await?;

        let page = SearchPage {
            items: rows.iter().map(summarize).collect(),
            total,
        };
        self.cache.put(cache_key, page.clone()).await;
        Ok(page)
    }

    /// Detail view of one live content, or `None` when it does not exist or
    /// is soft-deleted. Zero engagement axes are presented as absent; the
    /// stored zeros remain authoritative.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn detail(&self, id: i64) -> Result<Option<ContentDetail>, TroveError> {
        let Some(row) = self.contents.detail_by_id(id).await? else {
            return Ok(None);
        };

        let m = &row.metrics;
        Ok(Some(ContentDetail {
            summary: ContentSummary {
                id: row.content.id,
                title: row.content.title.clone(),
                content_type: row.content.content_type,
                description: row.content.description.clone(),
                url: row.content.url.clone(),
                thumbnail_url: row.content.thumbnail_url.clone(),
                score: m.final_score,
                published_at: row.content.published_at,
                provider: row.content.provider_id.clone(),
            },
            metrics: MetricsDetail {
                views: (m.views != 0).then_some(m.views),
                likes: (m.likes != 0).then_some(m.likes),
                reading_time: (m.reading_time != 0).then_some(m.reading_time),
                reactions: (m.reactions != 0).then_some(m.reactions),
                recalculated_at: m.recalculated_at,
            },
        }))
    }

    /// Aggregate corpus statistics: totals, per-type counts, the average
    /// score (two decimals), the per-provider breakdown, and the most
    /// recent sync completion across all providers.
    ///
    /// # Errors
    /// Propagates store failures from the content queries; a failing
    /// last-sync lookup degrades that provider's entry instead of failing
    /// the whole snapshot.
    pub async fn stats(&self) -> Result<StatsSnapshot, TroveError> {
        let total_contents = self.contents.count_all().await?;
        let by_type = self.contents.count_by_type().await?;
        let average = self.contents.average_score().await?;
        let by_provider = self.contents.count_by_provider().await?;

        let mut provider_ids: Vec<String> = by_provider.keys().cloned().collect();
        provider_ids.sort_unstable();

        let mut providers = Vec::with_capacity(provider_ids.len());
        let mut last_sync = None;
        for provider_id in provider_ids {
            let completed = match self.history.last_sync_time(&provider_id).await {
                Ok(ts) => ts,
                Err(e) => {
                    warn!(provider = %provider_id, error = %e, "last-sync lookup failed");
                    None
                }
            };
            if let Some(ts) = completed {
                last_sync = Some(last_sync.map_or(ts, |cur: chrono::DateTime<chrono::Utc>| {
                    cur.max(ts)
                }));
            }
            providers.push(ProviderStats {
                content_count: by_provider.get(&provider_id).copied().unwrap_or(0),
                provider_id,
                last_sync: completed,
            });
        }

        Ok(StatsSnapshot {
            total_contents,
            total_videos: by_type.get(&ContentType::Video).copied().unwrap_or(0),
            total_texts: by_type.get(&ContentType::Text).copied().unwrap_or(0),
            average_score: round2(average),
            last_sync,
            providers,
        })
    }
}

fn summarize(row: &ContentWithMetrics) -> ContentSummary {
    ContentSummary {
        id: row.content.id,
        title: row.content.title.clone(),
        content_type: row.content.content_type,
        description: row
            .content
            .description
            .as_deref()
            .map(|d| truncate_chars(d, SUMMARY_DESCRIPTION_CHARS)),
        url: row.content.url.clone(),
        thumbnail_url: row.content.thumbnail_url.clone(),
        score: row.metrics.final_score,
        published_at: row.content.published_at,
        provider: row.content.provider_id.clone(),
    }
}

/// Truncate to `max` characters on a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
