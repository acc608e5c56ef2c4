
use super::models::*;
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

pub struct IngestedDocumentQueries;

impl IngestedDocumentQueries {
    #[inline]
    pub async fn create(
        pool: &SqlitePool,
        new_document: NewIngestedDocument,
    ) -> Result<IngestedDocument> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO documents (path, source, page_count, chunk_count, ingested_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_document.path)
        .bind(&new_document.source)
        .bind(new_document.page_count)
        .bind(new_document.chunk_count)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to record ingested document")?
        .last_insert_rowid();

        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve recorded document"))
    }

    #[inline]
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<IngestedDocument>> {
        let result = sqlx::query_as::<_, IngestedDocument>(
            r#"
            SELECT id, path, source, page_count, chunk_count, ingested_at
            FROM documents WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get document by id")?;

        Ok(result)
    }

    #[inline]
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<IngestedDocument>> {
        let documents = sqlx::query_as::<_, IngestedDocument>(
            r#"
            SELECT id, path, source, page_count, chunk_count, ingested_at
            FROM documents ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
        .context("Failed to list documents")?;

        Ok(documents)
    }

    #[inline]
    pub async fn total_chunks(pool: &SqlitePool) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(chunk_count), 0) FROM documents")
            .fetch_one(pool)
            .await
            .context("Failed to sum chunk counts")?;

        Ok(total)
    }

    #[inline]
    pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM documents")
            .execute(pool)
            .await
            .context("Failed to clear documents")?
            .rows_affected();

        debug!("Removed {} ledger entries", deleted);
        Ok(deleted)
    }
}
