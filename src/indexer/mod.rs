// Indexer module
// Loads PDFs into the vector store and keeps the ingestion ledger in step


use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::config::Config;
use crate::database::lancedb::VectorStore;
use crate::database::sqlite::Database;
use crate::database::sqlite::models::NewIngestedDocument;
use crate::loader::{DocumentChunk, DocumentLoader, TokenSplitter};
use crate::{CarinaError, Result};

/// Turns PDF files into stored chunk embeddings
#[derive(Debug)]
pub struct Indexer {
    vector_store: Arc<VectorStore>,
    database: Option<Database>,
    loader: DocumentLoader,
    splitter: TokenSplitter,
}

/// What a single document contributed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStats {
    pub source: String,
    pub pages: usize,
    pub chunks: usize,
}

/// Statistics about an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingStats {
    pub documents_processed: usize,
    pub pages_processed: usize,
    pub chunks_stored: usize,
}

impl Indexer {
    #[inline]
    pub fn new(
        vector_store: Arc<VectorStore>,
        database: Option<Database>,
        loader: DocumentLoader,
        splitter: TokenSplitter,
    ) -> Self {
        Self {
            vector_store,
            database,
            loader,
            splitter,
        }
    }

    /// Build an indexer using the configured cleanup and chunking policy
    #[inline]
    pub fn from_config(
        config: &Config,
        vector_store: Arc<VectorStore>,
        database: Option<Database>,
    ) -> Result<Self> {
        Ok(Self::new(
            vector_store,
            database,
            DocumentLoader::from_config(&config.chunking),
            TokenSplitter::from_config(&config.chunking)?,
        ))
    }

    #[inline]
    pub fn vector_store(&self) -> &Arc<VectorStore> {
        &self.vector_store
    }

    /// Remove every stored record and forget every ingested document
    #[inline]
    pub async fn reset(&self) -> Result<()> {
        self.vector_store.reset().await?;
        if let Some(database) = &self.database {
            let cleared = database.clear().await.map_err(ledger_error)?;
            debug!("Cleared {} ledger entries", cleared);
        }
        Ok(())
    }

    /// Load, chunk, embed and store the PDF at `path`
    #[inline]
    pub async fn load(&self, path: &Path) -> Result<DocumentStats> {
        let loader = self.loader.clone();
        let owned_path = path.to_path_buf();
        let document = tokio::task::spawn_blocking(move || loader.load(&owned_path))
            .await
            .map_err(|e| {
                CarinaError::Document(format!("Loading {} failed: {}", path.display(), e))
            })??;

        let chunks: Vec<DocumentChunk> = document.chunks(&self.splitter).collect();
        debug!(
            "Split {} into {} chunks",
            document.source,
            chunks.len()
        );
        let stored = self.vector_store.upsert(&chunks).await?;

        if let Some(database) = &self.database {
            database
                .record_document(NewIngestedDocument {
                    path: path.display().to_string(),
                    source: document.source.clone(),
                    page_count: document.page_count as i64,
                    chunk_count: stored as i64,
                })
                .await
                .map_err(ledger_error)?;
        }

        info!(
            "Ingested {} ({} pages, {} chunks)",
            document.source, document.page_count, stored
        );
        Ok(DocumentStats {
            source: document.source,
            pages: document.page_count,
            chunks: stored,
        })
    }

    /// Load every document in order, stopping at the first failure
    #[inline]
    pub async fn load_all(&self, paths: &[PathBuf]) -> Result<IndexingStats> {
        let bar = if console::user_attended_stderr() {
            ProgressBar::new(paths.len() as u64).with_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] Ingesting {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            )
        } else {
            ProgressBar::hidden()
        };

        let mut stats = IndexingStats::default();
        for path in paths {
            bar.set_message(path.display().to_string());
            let document = match self.load(path).await {
                Ok(document) => document,
                Err(e) => {
                    bar.abandon();
                    return Err(e);
                }
            };

            stats.documents_processed += 1;
            stats.pages_processed += document.pages;
            stats.chunks_stored += document.chunks;
            bar.inc(1);
        }
        bar.finish_and_clear();

        info!(
            "Ingested {} documents ({} pages, {} chunks)",
            stats.documents_processed, stats.pages_processed, stats.chunks_stored
        );
        Ok(stats)
    }
}

fn ledger_error(e: anyhow::Error) -> CarinaError {
    CarinaError::Database(format!("{:#}", e))
}
