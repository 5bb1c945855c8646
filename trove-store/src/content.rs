use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use trove_core::repository::ContentRepository;
use trove_core::TroveError;
use trove_types::{
    Content, ContentMetrics, ContentType, ContentWithMetrics, Pagination, PaginationConfig,
    SearchSort,
};

use crate::store_err;

const CONTENT_COLS: &str = "c.id, c.provider_id, c.provider_content_id, c.title, \
     c.content_type, c.description, c.url, c.thumbnail_url, c.published_at, \
     c.created_at, c.updated_at, c.deleted_at";

const METRIC_COLS: &str = "cm.id AS m_id, cm.content_id, cm.views, cm.likes, \
     cm.reading_time, cm.reactions, cm.final_score, cm.recalculated_at, \
     cm.created_at AS m_created_at, cm.updated_at AS m_updated_at";

/// Postgres-backed [`ContentRepository`].
pub struct PgContentRepository {
    pool: PgPool,
    pagination: PaginationConfig,
}

impl PgContentRepository {
    /// Wrap a pool, normalizing pagination with the given bounds.
    #[must_use]
    pub const fn new(pool: PgPool, pagination: PaginationConfig) -> Self {
        Self { pool, pagination }
    }
}

fn content_type_from_str(s: &str) -> Result<ContentType, TroveError> {
    ContentType::parse(s)
        .ok_or_else(|| TroveError::store(format!("unknown content_type in store: {s}")))
}

fn content_from_row(row: &PgRow) -> Result<Content, TroveError> {
    let kind: String = row.try_get("content_type").map_err(store_err)?;
    Ok(Content {
        id: row.try_get("id").map_err(store_err)?,
        provider_id: row.try_get("provider_id").map_err(store_err)?,
        provider_content_id: row.try_get("provider_content_id").map_err(store_err)?,
        title: row.try_get("title").map_err(store_err)?,
        content_type: content_type_from_str(&kind)?,
        description: row.try_get("description").map_err(store_err)?,
        url: row.try_get("url").map_err(store_err)?,
        thumbnail_url: row.try_get("thumbnail_url").map_err(store_err)?,
        published_at: row.try_get("published_at").map_err(store_err)?,
        created_at: row.try_get("created_at").map_err(store_err)?,
        updated_at: row.try_get("updated_at").map_err(store_err)?,
        deleted_at: row.try_get("deleted_at").map_err(store_err)?,
    })
}

fn joined_from_row(row: &PgRow) -> Result<ContentWithMetrics, TroveError> {
    let content = content_from_row(row)?;
    let metrics = ContentMetrics {
        id: row.try_get("m_id").map_err(store_err)?,
        content_id: row.try_get("content_id").map_err(store_err)?,
        views: row.try_get("views").map_err(store_err)?,
        likes: row.try_get("likes").map_err(store_err)?,
        reading_time: row.try_get("reading_time").map_err(store_err)?,
        reactions: row.try_get("reactions").map_err(store_err)?,
        final_score: row.try_get("final_score").map_err(store_err)?,
        recalculated_at: row.try_get("recalculated_at").map_err(store_err)?,
        created_at: row.try_get("m_created_at").map_err(store_err)?,
        updated_at: row.try_get("m_updated_at").map_err(store_err)?,
    };
    Ok(ContentWithMetrics { content, metrics })
}

/// The FTS-or-trigram match predicate shared by the search select and count.
fn push_keyword_predicate<'a>(qb: &mut QueryBuilder<'a, Postgres>, keyword: &'a str) {
    qb.push(
        " AND (to_tsvector('english', c.title || ' ' || COALESCE(c.description, '')) \
         @@ plainto_tsquery('english', ",
    );
    qb.push_bind(keyword);
    qb.push(") OR similarity(");
    qb.push_bind(keyword);
    qb.push(", c.title) > 0.1 OR similarity(");
    qb.push_bind(keyword);
    qb.push(", COALESCE(c.description, '')) > 0.1)");
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn create(&self, content: &mut Content) -> Result<(), TroveError> {
        let row = sqlx::query(
            "INSERT INTO contents (provider_id, provider_content_id, title, content_type, \
             description, url, thumbnail_url, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, created_at, updated_at",
        )
        .bind(&content.provider_id)
        .bind(&content.provider_content_id)
        .bind(&content.title)
        .bind(content.content_type.as_str())
        .bind(&content.description)
        .bind(&content.url)
        .bind(&content.thumbnail_url)
        .bind(content.published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        content.id = row.try_get("id").map_err(store_err)?;
        content.created_at = row.try_get("created_at").map_err(store_err)?;
        content.updated_at = row.try_get("updated_at").map_err(store_err)?;
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Content>, TroveError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTENT_COLS} FROM contents c WHERE c.id = $1 AND c.deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(content_from_row).transpose()
    }

    async fn get_by_provider_key(
        &self,
        provider_id: &str,
        provider_content_id: &str,
    ) -> Result<Option<Content>, TroveError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTENT_COLS} FROM contents c \
             WHERE c.provider_id = $1 AND c.provider_content_id = $2"
        ))
        .bind(provider_id)
        .bind(provider_content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(content_from_row).transpose()
    }

    async fn update(&self, content: &mut Content) -> Result<(), TroveError> {
        let row = sqlx::query(
            "UPDATE contents SET provider_id = $1, provider_content_id = $2, title = $3, \
             content_type = $4, description = $5, url = $6, thumbnail_url = $7, \
             published_at = $8, updated_at = NOW() \
             WHERE id = $9 RETURNING updated_at",
        )
        .bind(&content.provider_id)
        .bind(&content.provider_content_id)
        .bind(&content.title)
        .bind(content.content_type.as_str())
        .bind(&content.description)
        .bind(&content.url)
        .bind(&content.thumbnail_url)
        .bind(content.published_at)
        .bind(content.id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        content.updated_at = row.try_get("updated_at").map_err(store_err)?;
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), TroveError> {
        sqlx::query("UPDATE contents SET deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn bulk_insert(&self, contents: &[Content]) -> Result<(), TroveError> {
        if contents.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        for c in contents {
            sqlx::query(
                "INSERT INTO contents (provider_id, provider_content_id, title, content_type, \
                 description, url, thumbnail_url, published_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (provider_id, provider_content_id) DO NOTHING",
            )
            .bind(&c.provider_id)
            .bind(&c.provider_content_id)
            .bind(&c.title)
            .bind(c.content_type.as_str())
            .bind(&c.description)
            .bind(&c.url)
            .bind(&c.thumbnail_url)
            .bind(c.published_at)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)
    }

    async fn list_ids(&self, offset: u64, limit: u64) -> Result<Vec<i64>, TroveError> {
        let rows = sqlx::query(
            "SELECT id FROM contents WHERE deleted_at IS NULL ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|r| r.try_get("id").map_err(store_err))
            .collect()
    }

    async fn list_ids_by_type(
        &self,
        content_type: ContentType,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<i64>, TroveError> {
        let rows = sqlx::query(
            "SELECT id FROM contents WHERE content_type = $1 AND deleted_at IS NULL \
             ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(content_type.as_str())
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|r| r.try_get("id").map_err(store_err))
            .collect()
    }

    async fn count_all(&self) -> Result<i64, TroveError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM contents WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        row.try_get("n").map_err(store_err)
    }

    async fn count_by_type(&self) -> Result<HashMap<ContentType, i64>, TroveError> {
        let rows = sqlx::query(
            "SELECT content_type, COUNT(*) AS n FROM contents \
             WHERE deleted_at IS NULL GROUP BY content_type",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let mut out = HashMap::new();
        for row in &rows {
            let kind: String = row.try_get("content_type").map_err(store_err)?;
            out.insert(
                content_type_from_str(&kind)?,
                row.try_get("n").map_err(store_err)?,
            );
        }
        Ok(out)
    }

    async fn count_by_provider(&self) -> Result<HashMap<String, i64>, TroveError> {
        let rows = sqlx::query(
            "SELECT provider_id, COUNT(*) AS n FROM contents \
             WHERE deleted_at IS NULL GROUP BY provider_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        let mut out = HashMap::new();
        for row in &rows {
            out.insert(
                row.try_get("provider_id").map_err(store_err)?,
                row.try_get("n").map_err(store_err)?,
            );
        }
        Ok(out)
    }

    async fn average_score(&self) -> Result<f64, TroveError> {
        let row = sqlx::query(
            "SELECT COALESCE(AVG(cm.final_score), 0) AS avg FROM content_metrics cm \
             INNER JOIN contents c ON c.id = cm.content_id WHERE c.deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        row.try_get("avg").map_err(store_err)
    }

    async fn average_score_by_provider(&self, provider_id: &str) -> Result<f64, TroveError> {
        let row = sqlx::query(
            "SELECT COALESCE(AVG(cm.final_score), 0) AS avg FROM content_metrics cm \
             INNER JOIN contents c ON c.id = cm.content_id \
             WHERE c.provider_id = $1 AND c.deleted_at IS NULL",
        )
        .bind(provider_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        row.try_get("avg").map_err(store_err)
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

        // An empty keyword short-circuits to match-all; the combined
        // FTS-or-trigram predicate only ever runs for a non-empty keyword.
        if keyword.is_empty() {
            self.browse(content_type, pagination, sort).await
        } else {
            self.search_keyword(keyword, content_type, pagination, sort)
                .await
        }
    }

    async fn detail_by_id(&self, id: i64) -> Result<Option<ContentWithMetrics>, TroveError> {
        let row = sqlx::query(&format!(
            "SELECT {CONTENT_COLS}, {METRIC_COLS} FROM contents c \
             INNER JOIN content_metrics cm ON cm.content_id = c.id \
             WHERE c.id = $1 AND c.deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref().map(joined_from_row).transpose()
    }
}

impl PgContentRepository {
    async fn browse(
        &self,
        content_type: Option<ContentType>,
        pagination: Pagination,
        sort: SearchSort,
    ) -> Result<(Vec<ContentWithMetrics>, i64), TroveError> {
        let mut count_qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) AS n FROM contents c \
             INNER JOIN content_metrics cm ON cm.content_id = c.id \
             WHERE c.deleted_at IS NULL",
        );
        if let Some(t) = content_type {
            count_qb.push(" AND c.content_type = ");
            count_qb.push_bind(t.as_str());
        }
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?
            .try_get("n")
            .map_err(store_err)?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLS}, {METRIC_COLS} FROM contents c \
             INNER JOIN content_metrics cm ON cm.content_id = c.id \
             WHERE c.deleted_at IS NULL"
        ));
        if let Some(t) = content_type {
            qb.push(" AND c.content_type = ");
            qb.push_bind(t.as_str());
        }
        qb.push(match sort {
            SearchSort::ScoreDesc => " ORDER BY cm.final_score DESC NULLS LAST",
            SearchSort::ScoreAsc => " ORDER BY cm.final_score ASC NULLS LAST",
            SearchSort::DateDesc => " ORDER BY c.published_at DESC NULLS LAST",
            SearchSort::DateAsc => " ORDER BY c.published_at ASC NULLS LAST",
        });
        qb.push(" LIMIT ");
        qb.push_bind(pagination.page_size as i64);
        qb.push(" OFFSET ");
        qb.push_bind(pagination.offset() as i64);

        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_err)?;
        let items = rows
            .iter()
            .map(joined_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn search_keyword(
        &self,
        keyword: &str,
        content_type: Option<ContentType>,
        pagination: Pagination,
        sort: SearchSort,
    ) -> Result<(Vec<ContentWithMetrics>, i64), TroveError> {
        let mut count_qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) AS n FROM contents c \
             INNER JOIN content_metrics cm ON cm.content_id = c.id \
             WHERE c.deleted_at IS NULL",
        );
        push_keyword_predicate(&mut count_qb, keyword);
        if let Some(t) = content_type {
            count_qb.push(" AND c.content_type = ");
            count_qb.push_bind(t.as_str());
        }
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?
            .try_get("n")
            .map_err(store_err)?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLS}, {METRIC_COLS}, \
             ts_rank(to_tsvector('english', c.title || ' ' || COALESCE(c.description, '')), \
                     plainto_tsquery('english', "
        ));
        qb.push_bind(keyword);
        qb.push(")) * 0.7 + GREATEST(similarity(");
        qb.push_bind(keyword);
        qb.push(", c.title), similarity(");
        qb.push_bind(keyword);
        qb.push(
            ", COALESCE(c.description, ''))) * 0.3 AS relevance \
             FROM contents c INNER JOIN content_metrics cm ON cm.content_id = c.id \
             WHERE c.deleted_at IS NULL",
        );
        push_keyword_predicate(&mut qb, keyword);
        if let Some(t) = content_type {
            qb.push(" AND c.content_type = ");
            qb.push_bind(t.as_str());
        }
        qb.push(match sort {
            SearchSort::ScoreDesc => " ORDER BY cm.final_score DESC, relevance DESC",
            SearchSort::ScoreAsc => " ORDER BY cm.final_score ASC, relevance DESC",
            SearchSort::DateDesc => " ORDER BY c.published_at DESC NULLS LAST, relevance DESC",
            SearchSort::DateAsc => " ORDER BY c.published_at ASC NULLS LAST, relevance DESC",
        });
        qb.push(" LIMIT ");
        qb.push_bind(pagination.page_size as i64);
        qb.push(" OFFSET ");
        qb.push_bind(pagination.offset() as i64);

        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_err)?;
        let items = rows
            .iter()
            .map(joined_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }
}
