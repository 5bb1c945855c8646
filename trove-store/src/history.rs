use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use trove_core::repository::SyncHistoryRepository;
use trove_core::TroveError;
use trove_types::{SyncHistory, SyncStatus};

use crate::store_err;

const HISTORY_COLS: &str = "id, provider_id, sync_status, total_fetched, new_contents, \
     updated_contents, skipped_contents, failed_contents, error_message, started_at, \
     completed_at, duration_ms";

/// Postgres-backed [`SyncHistoryRepository`].
pub struct PgSyncHistoryRepository {
    pool: PgPool,
}

impl PgSyncHistoryRepository {
    /// Wrap a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn history_from_row(row: &PgRow) -> Result<SyncHistory, TroveError> {
    let status: String = row.try_get("sync_status").map_err(store_err)?;
    Ok(SyncHistory {
        id: row.try_get("id").map_err(store_err)?,
        provider_id: row.try_get("provider_id").map_err(store_err)?,
        status: SyncStatus::parse(&status)
            .ok_or_else(|| TroveError::store(format!("unknown sync_status in store: {status}")))?,
        total_fetched: row.try_get("total_fetched").map_err(store_err)?,
        new_contents: row.try_get("new_contents").map_err(store_err)?,
        updated_contents: row.try_get("updated_contents").map_err(store_err)?,
        skipped_contents: row.try_get("skipped_contents").map_err(store_err)?,
        failed_contents: row.try_get("failed_contents").map_err(store_err)?,
        error_message: row.try_get("error_message").map_err(store_err)?,
        started_at: row.try_get("started_at").map_err(store_err)?,
        completed_at: row.try_get("completed_at").map_err(store_err)?,
        duration_ms: row.try_get("duration_ms").map_err(store_err)?,
    })
}

#[async_trait]
impl SyncHistoryRepository for PgSyncHistoryRepository {
    async fn create(&self, history: &mut SyncHistory) -> Result<(), TroveError> {
        let row = sqlx::query(
            "INSERT INTO sync_history (provider_id, sync_status, total_fetched, new_contents, \
             updated_contents, skipped_contents, failed_contents, error_message, started_at, \
             completed_at, duration_ms) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
        )
        .bind(&history.provider_id)
        .bind(history.status.as_str())
        .bind(history.total_fetched)
        .bind(history.new_contents)
        .bind(history.updated_contents)
        .bind(history.skipped_contents)
        .bind(history.failed_contents)
        .bind(&history.error_message)
        .bind(history.started_at)
        .bind(history.completed_at)
        .bind(history.duration_ms)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        history.id = row.try_get("id").map_err(store_err)?;
        Ok(())
    }

    async fn update(&self, history: &SyncHistory) -> Result<(), TroveError> {
        sqlx::query(
            "UPDATE sync_history SET sync_status = $1, total_fetched = $2, new_contents = $3, \
             updated_contents = $4, skipped_contents = $5, failed_contents = $6, \
             error_message = $7, completed_at = $8, duration_ms = $9 WHERE id = $10",
        )
        .bind(history.status.as_str())
        .bind(history.total_fetched)
        .bind(history.new_contents)
        .bind(history.updated_contents)
        .bind(history.skipped_contents)
        .bind(history.failed_contents)
        .bind(&history.error_message)
        .bind(history.completed_at)
        .bind(history.duration_ms)
        .bind(history.id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn last_sync(&self, provider_id: &str) -> Result<Option<SyncHistory>, TroveError> {
        let row = sqlx::query(&format!(
            "SELECT {HISTORY_COLS} FROM sync_history WHERE provider_id = $1 \
             ORDER BY started_at DESC LIMIT 1"
        ))
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(history_from_row).transpose()
    }

    async fn list(
        &self,
        provider_id: Option<&str>,
        status: Option<SyncStatus>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<SyncHistory>, TroveError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {HISTORY_COLS} FROM sync_history WHERE 1=1"));
        if let Some(pid) = provider_id {
            qb.push(" AND provider_id = ");
            qb.push_bind(pid);
        }
        if let Some(st) = status {
            qb.push(" AND sync_status = ");
            qb.push_bind(st.as_str());
        }
        qb.push(" ORDER BY started_at DESC LIMIT ");
        qb.push_bind(limit as i64);
        qb.push(" OFFSET ");
        qb.push_bind(offset as i64);

        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_err)?;
        rows.iter().map(history_from_row).collect()
    }

    async fn count(
        &self,
        provider_id: Option<&str>,
        status: Option<SyncStatus>,
    ) -> Result<i64, TroveError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) AS n FROM sync_history WHERE 1=1");
        if let Some(pid) = provider_id {
            qb.push(" AND provider_id = ");
            qb.push_bind(pid);
        }
        if let Some(st) = status {
            qb.push(" AND sync_status = ");
            qb.push_bind(st.as_str());
        }
        qb.build()
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?
            .try_get("n")
            .map_err(store_err)
    }

    async fn recent(&self, limit: u64) -> Result<Vec<SyncHistory>, TroveError> {
        let rows = sqlx::query(&format!(
            "SELECT {HISTORY_COLS} FROM sync_history ORDER BY started_at DESC LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(history_from_row).collect()
    }
}
