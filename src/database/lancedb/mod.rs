// LanceDB vector database module
// Handles vector storage and similarity search for chunk embeddings

pub mod vector_store;

use serde::{Deserialize, Serialize};

use crate::loader::ChunkMetadata;

pub use vector_store::{SearchResult, VectorStore};

/// One row of the `vector_store` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Random UUID assigned at insertion
    pub id: String,
    /// Embedding of `content`
    pub vector: Vec<f32>,
    /// The chunk text
    pub content: String,
    /// Where the chunk came from
    pub metadata: ChunkMetadata,
    /// RFC 3339 timestamp of insertion
    pub created_at: String,
}
