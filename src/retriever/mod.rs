// Retriever module
// Finds the chunks most relevant to a question


use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::Result;
use crate::database::lancedb::{SearchResult, VectorStore};

/// Source of context documents for a question
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Documents relevant to `query`, most similar first
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Top-k similarity search against the vector store
#[derive(Debug, Clone)]
pub struct VectorStoreRetriever {
    store: Arc<VectorStore>,
    top_k: usize,
    similarity_threshold: f32,
}

impl VectorStoreRetriever {
    #[inline]
    pub fn new(store: Arc<VectorStore>, top_k: usize, similarity_threshold: f32) -> Self {
        Self {
            store,
            top_k,
            similarity_threshold,
        }
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[inline]
    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }
}

#[async_trait]
impl DocumentRetriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let results = self
            .store
            .search(query, self.top_k, self.similarity_threshold)
            .await?;
        debug!("Retrieved {} documents for query", results.len());
        Ok(results)
    }
}
