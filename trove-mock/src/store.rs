use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use trove_core::repository::{
    ContentMetricsRepository, ContentRepository, SyncHistoryRepository,
};
use trove_core::TroveError;
use trove_types::{
    Content, ContentMetrics, ContentType, ContentWithMetrics, Pagination, PaginationConfig,
    SearchSort, SyncHistory, SyncStatus,
};

#[derive(Default)]
struct Inner {
    contents: Vec<Content>,
    metrics: HashMap<i64, ContentMetrics>,
    history: Vec<SyncHistory>,
    next_content_id: i64,
    next_metrics_id: i64,
    next_history_id: i64,
}

/// In-memory store implementing all three repository traits.
///
/// Search approximates the SQL contract with a case-insensitive substring
/// match over title and description standing in for the full-text ∪ trigram
/// predicate; sorting, pagination normalization, soft-delete filtering, and
/// totals follow the real gateway. Intended for tests; nothing persists.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    pagination: PaginationConfig,
}

impl MemoryStore {
    /// An empty store with default pagination bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mutex poisoned")
    }

    /// Number of stored metrics rows owned by `content_id` (0 or 1 when the
    /// one-row invariant holds).
    pub fn metrics_rows_for(&self, content_id: i64) -> usize {
        usize::from(self.lock().metrics.contains_key(&content_id))
    }

    /// All audit rows, in creation order.
    pub fn history_rows(&self) -> Vec<SyncHistory> {
        self.lock().history.clone()
    }
}

fn matches_keyword(content: &Content, keyword: &str) -> bool {
    let kw = keyword.to_lowercase();
    content.title.to_lowercase().contains(&kw)
        || content
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&kw))
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn create(&self, content: &mut Content) -> Result<(), TroveError> {
        let mut inner = self.lock();
        let exists = inner.contents.iter().any(|c| {
            c.provider_id == content.provider_id
                && c.provider_content_id == content.provider_content_id
        });
        if exists {
            return Err(TroveError::store(format!(
                "duplicate provider key ({}, {})",
                content.provider_id, content.provider_content_id
            )));
        }
        inner.next_content_id += 1;
        content.id = inner.next_content_id;
        let now = Utc::now();
        content.created_at = now;
        content.updated_at = now;
        inner.contents.push(content.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Content>, TroveError> {
        Ok(self
            .lock()
            .contents
            .iter()
            .find(|c| c.id == id && c.is_live())
            .cloned())
    }

    async fn get_by_provider_key(
        &self,
        provider_id: &str,
        provider_content_id: &str,
    ) -> Result<Option<Content>, TroveError> {
        Ok(self
            .lock()
            .contents
            .iter()
            .find(|c| {
                c.provider_id == provider_id && c.provider_content_id == provider_content_id
            })
            .cloned())
    }

    async fn update(&self, content: &mut Content) -> Result<(), TroveError> {
        let mut inner = self.lock();
        let Some(stored) = inner.contents.iter_mut().find(|c| c.id == content.id) else {
            return Err(TroveError::store(format!(
                "no content with id {}",
                content.id
            )));
        };
        content.updated_at = Utc::now();
        *stored = content.clone();
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), TroveError> {
        let mut inner = self.lock();
        if let Some(c) = inner.contents.iter_mut().find(|c| c.id == id) {
            c.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn bulk_insert(&self, contents: &[Content]) -> Result<(), TroveError> {
        let mut inner = self.lock();
        for content in contents {
            let exists = inner.contents.iter().any(|c| {
                c.provider_id == content.provider_id
                    && c.provider_content_id == content.provider_content_id
            });
            if exists {
                continue;
            }
            inner.next_content_id += 1;
            let mut c = content.clone();
            c.id = inner.next_content_id;
            let now = Utc::now();
            c.created_at = now;
            c.updated_at = now;
            inner.contents.push(c);
        }
        Ok(())
    }

    async fn list_ids(&self, offset: u64, limit: u64) -> Result<Vec<i64>, TroveError> {
        let inner = self.lock();
        let mut ids: Vec<i64> = inner
            .contents
            .iter()
            .filter(|c| c.is_live())
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        Ok(ids
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_ids_by_type(
        &self,
        content_type: ContentType,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<i64>, TroveError> {
        let inner = self.lock();
        let mut ids: Vec<i64> = inner
            .contents
            .iter()
            .filter(|c| c.is_live() && c.content_type == content_type)
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        Ok(ids
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_all(&self) -> Result<i64, TroveError> {
        Ok(self.lock().contents.iter().filter(|c| c.is_live()).count() as i64)
    }

    async fn count_by_type(&self) -> Result<HashMap<ContentType, i64>, TroveError> {
        let inner = self.lock();
        let mut out = HashMap::new();
        for c in inner.contents.iter().filter(|c| c.is_live()) {
            *out.entry(c.content_type).or_insert(0) += 1;
        }
        Ok(out)
    }

    async fn count_by_provider(&self) -> Result<HashMap<String, i64>, TroveError> {
        let inner = self.lock();
        let mut out = HashMap::new();
        for c in inner.contents.iter().filter(|c| c.is_live()) {
            *out.entry(c.provider_id.clone()).or_insert(0) += 1;
        }
        Ok(out)
    }

    async fn average_score(&self) -> Result<f64, TroveError> {
        let inner = self.lock();
        let scores: Vec<f64> = inner
            .contents
            .iter()
            .filter(|c| c.is_live())
            .filter_map(|c| inner.metrics.get(&c.id).map(|m| m.final_score))
            .collect();
        if scores.is_empty() {
            return Ok(0.0);
        }
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    async fn average_score_by_provider(&self, provider_id: &str) -> Result<f64, TroveError> {
        let inner = self.lock();
        let scores: Vec<f64> = inner
            .contents
            .iter()
            .filter(|c| c.is_live() && c.provider_id == provider_id)
            .filter_map(|c| inner.metrics.get(&c.id).map(|m| m.final_score))
            .collect();
        if scores.is_empty() {
            return Ok(0.0);
        }
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    async fn search_with_filters(
        &self,
        keyword: &str,
        content_type: Option<ContentType>,
        pagination: Pagination,
        sort: SearchSort,
    ) -> Result<(Vec<ContentWithMetrics>, i64), TroveError> {
        let keyword = keyword.trim();
        let pagination = pagination.normalized(
            self.pagination.default_page_size,
            self.pagination.max_page_size,
        );

        let inner = self.lock();
        let mut rows: Vec<ContentWithMetrics> = inner
            .contents
            .iter()
            .filter(|c| c.is_live())
            .filter(|c| keyword.is_empty() || matches_keyword(c, keyword))
            .filter(|c| content_type.is_none_or(|t| c.content_type == t))
            .filter_map(|c| {
                inner.metrics.get(&c.id).map(|m| ContentWithMetrics {
                    content: c.clone(),
                    metrics: m.clone(),
                })
            })
            .collect();

        match sort {
            SearchSort::ScoreDesc => rows.sort_by(|a, b| {
                b.metrics
                    .final_score
                    .total_cmp(&a.metrics.final_score)
                    .then(a.content.id.cmp(&b.content.id))
            }),
            SearchSort::ScoreAsc => rows.sort_by(|a, b| {
                a.metrics
                    .final_score
                    .total_cmp(&b.metrics.final_score)
                    .then(a.content.id.cmp(&b.content.id))
            }),
            SearchSort::DateDesc => rows.sort_by(|a, b| {
                match (b.content.published_at, a.content.published_at) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Greater,
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (None, None) => std::cmp::Ordering::Equal,
                }
                .then(a.content.id.cmp(&b.content.id))
            }),
            SearchSort::DateAsc => rows.sort_by(|a, b| {
                match (a.content.published_at, b.content.published_at) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    // nulls last, matching the SQL ordering
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
                .then(a.content.id.cmp(&b.content.id))
            }),
        }

        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.page_size as usize)
            .collect();
        Ok((page, total))
    }

    async fn detail_by_id(&self, id: i64) -> Result<Option<ContentWithMetrics>, TroveError> {
        let inner = self.lock();
        Ok(inner
            .contents
            .iter()
            .find(|c| c.id == id && c.is_live())
            .and_then(|c| {
                inner.metrics.get(&c.id).map(|m| ContentWithMetrics {
                    content: c.clone(),
                    metrics: m.clone(),
                })
            }))
    }
}

#[async_trait]
impl ContentMetricsRepository for MemoryStore {
    async fn create(&self, metrics: &mut ContentMetrics) -> Result<(), TroveError> {
        let mut inner = self.lock();
        if inner.metrics.contains_key(&metrics.content_id) {
            return Err(TroveError::store(format!(
                "metrics already exist for content {}",
                metrics.content_id
            )));
        }
        inner.next_metrics_id += 1;
        metrics.id = inner.next_metrics_id;
        let now = Utc::now();
        metrics.created_at = now;
        metrics.updated_at = now;
        inner.metrics.insert(metrics.content_id, metrics.clone());
        Ok(())
    }

    async fn get_by_content_id(
        &self,
        content_id: i64,
    ) -> Result<Option<ContentMetrics>, TroveError> {
        Ok(self.lock().metrics.get(&content_id).cloned())
    }

    async fn update_by_content_id(
        &self,
        content_id: i64,
        metrics: &mut ContentMetrics,
    ) -> Result<(), TroveError> {
        let mut inner = self.lock();
        let Some(stored) = inner.metrics.get_mut(&content_id) else {
            return Err(TroveError::store(format!(
                "no metrics for content {content_id}"
            )));
        };
        metrics.id = stored.id;
        metrics.content_id = content_id;
        metrics.updated_at = Utc::now();
        *stored = metrics.clone();
        Ok(())
    }

    async fn bulk_upsert(&self, metrics: &[ContentMetrics]) -> Result<(), TroveError> {
        let mut inner = self.lock();
        for m in metrics {
            let now = Utc::now();
            if let Some(stored) = inner.metrics.get_mut(&m.content_id) {
                let id = stored.id;
                *stored = m.clone();
                stored.id = id;
                stored.updated_at = now;
            } else {
                inner.next_metrics_id += 1;
                let mut fresh = m.clone();
                fresh.id = inner.next_metrics_id;
                fresh.created_at = now;
                fresh.updated_at = now;
                inner.metrics.insert(m.content_id, fresh);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SyncHistoryRepository for MemoryStore {
    async fn create(&self, history: &mut SyncHistory) -> Result<(), TroveError> {
        let mut inner = self.lock();
        inner.next_history_id += 1;
        history.id = inner.next_history_id;
        inner.history.push(history.clone());
        Ok(())
    }

    async fn update(&self, history: &SyncHistory) -> Result<(), TroveError> {
        let mut inner = self.lock();
        let Some(stored) = inner.history.iter_mut().find(|h| h.id == history.id) else {
            return Err(TroveError::store(format!(
                "no sync_history row with id {}",
                history.id
            )));
        };
        *stored = history.clone();
        Ok(())
    }

    async fn last_sync(&self, provider_id: &str) -> Result<Option<SyncHistory>, TroveError> {
        Ok(self
            .lock()
            .history
            .iter()
            .filter(|h| h.provider_id == provider_id)
            .max_by_key(|h| h.started_at)
            .cloned())
    }

    async fn list(
        &self,
        provider_id: Option<&str>,
        status: Option<SyncStatus>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<SyncHistory>, TroveError> {
        let inner = self.lock();
        let mut rows: Vec<SyncHistory> = inner
            .history
            .iter()
            .filter(|h| provider_id.is_none_or(|p| h.provider_id == p))
            .filter(|h| status.is_none_or(|s| h.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(
        &self,
        provider_id: Option<&str>,
        status: Option<SyncStatus>,
    ) -> Result<i64, TroveError> {
        Ok(self
            .lock()
            .history
            .iter()
            .filter(|h| provider_id.is_none_or(|p| h.provider_id == p))
            .filter(|h| status.is_none_or(|s| h.status == s))
            .count() as i64)
    }

    async fn recent(&self, limit: u64) -> Result<Vec<SyncHistory>, TroveError> {
        let inner = self.lock();
        let mut rows = inner.history.clone();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}
