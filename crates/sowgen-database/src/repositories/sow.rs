//! PostgreSQL-backed SOW collection.
//!
//! Each document is stored whole in a JSONB column. The scalar columns copy
//! the fields that predicates and listings filter on and are rewritten on
//! every write.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::error;

use sowgen_core::error::{AppError, ErrorKind};
use sowgen_core::result::AppResult;
use sowgen_core::types::SowId;
use sowgen_entity::sow::Sow;

use crate::collection::{SowCollection, SowFilter, SowMutation, SowQuery};

const PREDICATE: &str =
    "id = $1 AND ($2::bigint IS NULL OR version = $2) AND ($3::uuid IS NULL OR client_id = $3)";

/// [`SowCollection`] over a `sows` table.
#[derive(Debug, Clone)]
pub struct PgSowCollection {
    pool: PgPool,
}

impl PgSowCollection {
    /// Create a collection using `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))
    }
}

#[async_trait]
impl SowCollection for PgSowCollection {
    async fn find_one(&self, id: SowId) -> AppResult<Option<Sow>> {
        sqlx::query_scalar::<_, Json<Sow>>("SELECT document FROM sows WHERE id = $1")
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(|Json(sow)| sow))
            .map_err(|e| db_error("Failed to find SOW", e))
    }

    async fn insert_one(&self, sow: &Sow) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sows (id, client_id, status, version, created_at, updated_at, document) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(sow.id.into_uuid())
        .bind(sow.client_id.into_uuid())
        .bind(sow.status.as_str())
        .bind(version_column(sow.version)?)
        .bind(sow.created_at)
        .bind(sow.updated_at)
        .bind(Json(sow))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert SOW", e))?;
        Ok(())
    }

    async fn find_one_and_update(
        &self,
        filter: SowFilter,
        mutation: SowMutation,
    ) -> AppResult<Option<Sow>> {
        let mut tx = self.begin().await?;

        let locked = sqlx::query_scalar::<_, Json<Sow>>(&format!(
            "SELECT document FROM sows WHERE {PREDICATE} FOR UPDATE"
        ))
        .bind(filter.id.into_uuid())
        .bind(filter.version.map(version_column).transpose()?)
        .bind(filter.owner.map(|o| o.into_uuid()))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock SOW", e))?;

        let Some(Json(mut sow)) = locked else {
            return Ok(None);
        };
        // Applied to the row as locked, never to the caller's earlier read.
        mutation.apply_to(&mut sow)?;

        sqlx::query(
            "UPDATE sows SET status = $2, version = $3, updated_at = $4, document = $5 \
             WHERE id = $1",
        )
        .bind(sow.id.into_uuid())
        .bind(sow.status.as_str())
        .bind(version_column(sow.version)?)
        .bind(sow.updated_at)
        .bind(Json(&sow))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update SOW", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit SOW update", e))?;
        Ok(Some(sow))
    }

    async fn delete_one(&self, filter: SowFilter) -> AppResult<u64> {
        sqlx::query(&format!("DELETE FROM sows WHERE {PREDICATE}"))
            .bind(filter.id.into_uuid())
            .bind(filter.version.map(version_column).transpose()?)
            .bind(filter.owner.map(|o| o.into_uuid()))
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| db_error("Failed to delete SOW", e))
    }

    fn find(&self, query: SowQuery) -> BoxStream<'_, AppResult<Sow>> {
        sqlx::query_scalar::<_, Json<Sow>>(
            "SELECT document FROM sows \
             WHERE ($1::uuid IS NULL OR client_id = $1) AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(query.client_id.map(|c| c.into_uuid()))
        .bind(query.status.map(|s| s.as_str()))
        .fetch(&self.pool)
        .map(|row| {
            row.map(|Json(sow)| sow)
                .map_err(|e| db_error("Failed to list SOWs", e))
        })
        .boxed()
    }
}

fn version_column(version: u64) -> AppResult<i64> {
    i64::try_from(version)
        .map_err(|_| AppError::internal(format!("Version {version} exceeds column range")))
}

/// Map a sqlx error, keeping duplicate keys distinct from outages.
fn db_error(context: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::with_source(
                ErrorKind::Conflict,
                format!("{context}: duplicate id"),
                err,
            );
        }
    }
    error!(error = %err, "{context}");
    AppError::with_source(ErrorKind::PersistenceUnavailable, context.to_string(), err)
}
