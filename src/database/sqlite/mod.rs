use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{debug, info};

use crate::database::sqlite::models::{IngestedDocument, NewIngestedDocument};
use crate::database::sqlite::queries::IngestedDocumentQueries;


pub mod models;
pub mod queries;

pub type DbPool = Pool<Sqlite>;

/// Ingestion ledger: which documents are currently in the vector store
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    #[inline]
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let database = Self { pool };
        database.run_migrations().await?;

        Ok(database)
    }

    #[inline]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    #[inline]
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("src/database/sqlite/migrations")
            .run(&self.pool)
            .await
            .context("Failed to run schema migration")?;

        debug!("Database migrations completed successfully");
        Ok(())
    }

    /// Open `metadata.db` inside `data_dir`, creating the directory if needed
    #[inline]
    pub async fn initialize_from_data_dir(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;

        Self::new(data_dir.join("metadata.db")).await
    }

    #[inline]
    pub async fn record_document(
        &self,
        document: NewIngestedDocument,
    ) -> Result<IngestedDocument> {
        IngestedDocumentQueries::create(&self.pool, document).await
    }

    #[inline]
    pub async fn list_documents(&self) -> Result<Vec<IngestedDocument>> {
        IngestedDocumentQueries::list_all(&self.pool).await
    }

    #[inline]
    pub async fn total_chunks(&self) -> Result<i64> {
        IngestedDocumentQueries::total_chunks(&self.pool).await
    }

    /// Forget every ingested document
    #[inline]
    pub async fn clear(&self) -> Result<u64> {
        IngestedDocumentQueries::delete_all(&self.pool).await
    }
}
