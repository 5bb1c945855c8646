use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use trove_core::{
    ContentMetricsRepository, ContentRepository, ScoringEngine, TroveError,
};
use trove_types::{Content, ContentMetrics, ContentType, ProviderItem};

/// Persists scores computed by the pure [`ScoringEngine`]: first-time scoring
/// of new contents and recalculation of existing ones, singly or in batches.
pub struct ScoreCalculator {
    contents: Arc<dyn ContentRepository>,
    metrics: Arc<dyn ContentMetricsRepository>,
    engine: ScoringEngine,
}

impl ScoreCalculator {
    /// Build a calculator over the given repositories.
    #[must_use]
    pub fn new(
        contents: Arc<dyn ContentRepository>,
        metrics: Arc<dyn ContentMetricsRepository>,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            contents,
            metrics,
            engine,
        }
    }

    /// Insert a new content with its initial metrics row and score.
    ///
    /// Returns the assigned content id and the computed score.
    ///
    /// # Errors
    /// Propagates store failures; a conflict on the provider identity pair
    /// surfaces as [`TroveError::Store`].
    pub async fn process_new_item(&self, item: &ProviderItem) -> Result<(i64, f64), TroveError> {
        let now = Utc::now();
        let mut content = Content {
            id: 0,
            provider_id: item.provider_id.clone(),
            provider_content_id: item.provider_content_id.clone(),
            title: item.title.clone(),
            content_type: item.content_type,
            description: item.description.clone(),
            url: item.url.clone(),
            thumbnail_url: item.thumbnail_url.clone(),
            published_at: item.published_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.contents.create(&mut content).await?;

        let now = Utc::now();
        let mut metrics = ContentMetrics {
            id: 0,
            content_id: content.id,
            views: item.views.unwrap_or(0),
            likes: item.likes.unwrap_or(0),
            reading_time: item.reading_time.unwrap_or(0),
            reactions: item.reactions.unwrap_or(0),
            final_score: 0.0,
            recalculated_at: None,
            created_at: now,
            updated_at: now,
        };
        let score = self.engine.calculate(&content, &metrics, now);
        metrics.final_score = score;
        metrics.recalculated_at = Some(now);
        self.metrics.create(&mut metrics).await?;

        info!(content_id = content.id, score, "score calculated");
        Ok((content.id, score))
    }

    /// Re-read one content and its metrics, recompute the score, and persist
    /// it together with the recalculation timestamp.
    ///
    /// # Errors
    /// Returns [`TroveError::NotFound`] when the content is missing or
    /// soft-deleted, or when it has no metrics row yet.
    pub async fn recalculate(&self, content_id: i64) -> Result<f64, TroveError> {
        let content = self
            .contents
            .get_by_id(content_id)
            .await?
            .ok_or_else(|| TroveError::not_found(format!("content {content_id}")))?;
        let mut metrics = self
            .metrics
            .get_by_content_id(content_id)
            .await?
            .ok_or_else(|| TroveError::not_found(format!("metrics for content {content_id}")))?;

        let now = Utc::now();
        let score = self.engine.calculate(&content, &metrics, now);
        metrics.final_score = score;
        metrics.recalculated_at = Some(now);
        self.metrics.update_by_content_id(content_id, &mut metrics).await?;

        info!(content_id, score, "score recalculated");
        Ok(score)
    }

    /// Walk all live contents in id order, recomputing every score in
    /// batches of `batch_size`. Per-item failures are logged and do not
    /// abort the walk.
    ///
    /// Returns the number of contents visited.
    ///
    /// # Errors
    /// Returns store failures from the count and id listing only.
    pub async fn recalculate_all(&self, batch_size: u32) -> Result<u64, TroveError> {
        let total = self.contents.count_all().await?;
        let batch = u64::from(batch_size.max(1));
        let mut processed = 0u64;
        let mut offset = 0u64;

        while (offset as i64) < total {
            let ids = self.contents.list_ids(offset, batch).await?;
            if ids.is_empty() {
                break;
            }
            for id in ids {
                if let Err(e) = self.recalculate(id).await {
                    warn!(content_id = id, error = %e, "score recalculation failed");
                }
                processed += 1;
            }
            offset += batch;
        }
        Ok(processed)
    }

    /// Like [`Self::recalculate_all`], restricted to one content type.
    ///
    /// # Errors
    /// Returns store failures from the id listing only.
    pub async fn recalculate_by_type(
        &self,
        content_type: ContentType,
        batch_size: u32,
    ) -> Result<u64, TroveError> {
        let batch = u64::from(batch_size.max(1));
        let mut processed = 0u64;
        let mut offset = 0u64;

        loop {
            let ids = self
                .contents
                .list_ids_by_type(content_type, offset, batch)
                .await?;
            if ids.is_empty() {
                break;
            }
            let fetched = ids.len() as u64;
            for id in ids {
                if let Err(e) = self.recalculate(id).await {
                    warn!(content_id = id, error = %e, "score recalculation failed");
                }
                processed += 1;
            }
            if fetched < batch {
                break;
            }
            offset += batch;
        }
        Ok(processed)
    }
}
