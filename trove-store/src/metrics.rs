use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use trove_core::repository::ContentMetricsRepository;
use trove_core::TroveError;
use trove_types::ContentMetrics;

use crate::store_err;

/// Postgres-backed [`ContentMetricsRepository`].
pub struct PgContentMetricsRepository {
    pool: PgPool,
}

impl PgContentMetricsRepository {
    /// Wrap a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn metrics_from_row(row: &PgRow) -> Result<ContentMetrics, TroveError> {
    Ok(ContentMetrics {
        id: row.try_get("id").map_err(store_err)?,
        content_id: row.try_get("content_id").map_err(store_err)?,
        views: row.try_get("views").map_err(store_err)?,
        likes: row.try_get("likes").map_err(store_err)?,
        reading_time: row.try_get("reading_time").map_err(store_err)?,
        reactions: row.try_get("reactions").map_err(store_err)?,
        final_score: row.try_get("final_score").map_err(store_err)?,
        recalculated_at: row.try_get("recalculated_at").map_err(store_err)?,
        created_at: row.try_get("created_at").map_err(store_err)?,
        updated_at: row.try_get("updated_at").map_err(store_err)?,
    })
}

#[async_trait]
impl ContentMetricsRepository for PgContentMetricsRepository {
    async fn create(&self, metrics: &mut ContentMetrics) -> Result<(), TroveError> {
        let row = sqlx::query(
            "INSERT INTO content_metrics (content_id, views, likes, reading_time, reactions, \
             final_score, recalculated_at) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, created_at, updated_at",
        )
        .bind(metrics.content_id)
        .bind(metrics.views)
        .bind(metrics.likes)
        .bind(metrics.reading_time)
        .bind(metrics.reactions)
        .bind(metrics.final_score)
        .bind(metrics.recalculated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        metrics.id = row.try_get("id").map_err(store_err)?;
        metrics.created_at = row.try_get("created_at").map_err(store_err)?;
        metrics.updated_at = row.try_get("updated_at").map_err(store_err)?;
        Ok(())
    }

    async fn get_by_content_id(
        &self,
        content_id: i64,
    ) -> Result<Option<ContentMetrics>, TroveError> {
        let row = sqlx::query(
            "SELECT id, content_id, views, likes, reading_time, reactions, final_score, \
             recalculated_at, created_at, updated_at \
             FROM content_metrics WHERE content_id = $1",
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(metrics_from_row).transpose()
    }

    async fn update_by_content_id(
        &self,
        content_id: i64,
        metrics: &mut ContentMetrics,
    ) -> Result<(), TroveError> {
        let row = sqlx::query(
            "UPDATE content_metrics SET views = $1, likes = $2, reading_time = $3, \
             reactions = $4, final_score = $5, recalculated_at = $6, updated_at = NOW() \
             WHERE content_id = $7 RETURNING id, updated_at",
        )
        .bind(metrics.views)
        .bind(metrics.likes)
        .bind(metrics.reading_time)
        .bind(metrics.reactions)
        .bind(metrics.final_score)
        .bind(metrics.recalculated_at)
        .bind(content_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        metrics.id = row.try_get("id").map_err(store_err)?;
        metrics.updated_at = row.try_get("updated_at").map_err(store_err)?;
        Ok(())
    }

    async fn bulk_upsert(&self, metrics: &[ContentMetrics]) -> Result<(), TroveError> {
        if metrics.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        for m in metrics {
            sqlx::query(
                "INSERT INTO content_metrics (content_id, views, likes, reading_time, \
                 reactions, final_score, recalculated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (content_id) DO UPDATE SET \
                 views = EXCLUDED.views, likes = EXCLUDED.likes, \
                 reading_time = EXCLUDED.reading_time, reactions = EXCLUDED.reactions, \
                 final_score = EXCLUDED.final_score, \
                 recalculated_at = EXCLUDED.recalculated_at, updated_at = NOW()",
            )
            .bind(m.content_id)
            .bind(m.views)
            .bind(m.likes)
            .bind(m.reading_time)
            .bind(m.reactions)
            .bind(m.final_score)
            .bind(m.recalculated_at)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)
    }
}
