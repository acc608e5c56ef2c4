
use super::StoredRecord;
use crate::embeddings::Embedder;
use crate::loader::{ChunkMetadata, DocumentChunk};
use crate::{CarinaError, config::Config};
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::{
    Connection, DistanceType, Table,
    query::{ExecutableQuery, QueryBase},
};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Name of the table holding chunk embeddings
pub const TABLE_NAME: &str = "vector_store";

/// Chunk embeddings stored in LanceDB, searched by cosine similarity
///
/// Ingestion only ever appends. Calling [`VectorStore::upsert`] twice with the
/// same chunks without a [`VectorStore::reset`] in between stores every chunk
/// twice, and both copies come back from searches.
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    embedder: Arc<dyn Embedder>,
    vector_dimension: AtomicUsize,
}

/// Search result from vector similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub record: StoredRecord,
    /// `1 - distance`, higher is more similar
    pub similarity_score: f32,
    /// Cosine distance reported by LanceDB
    pub distance: f32,
}

impl fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStore")
            .field("table_name", &self.table_name)
            .field("vector_dimension", &self.vector_dimension())
            .finish_non_exhaustive()
    }
}

impl VectorStore {
    /// Open (or create) the vector table under the configured data directory
    ///
    /// # Arguments
    /// * `config` - Application configuration containing database paths
    /// * `embedder` - Embedder used for both chunks and queries
    ///
    /// # Returns
    /// * `Result<Self, CarinaError>` - New VectorStore instance or error
    #[inline]
    pub async fn new(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self, CarinaError> {
        let db_path = config.vector_database_path();
        debug!("Initializing LanceDB at path: {}", db_path.display());

        std::fs::create_dir_all(&db_path).map_err(|e| {
            CarinaError::Database(format!("Failed to create vector database directory: {}", e))
        })?;

        let connection = lancedb::connect(&db_path.to_string_lossy())
            .execute()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        let store = Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            embedder,
            vector_dimension: AtomicUsize::new(config.ollama.embedding_dimension as usize),
        };
        store.initialize_table().await?;

        info!(
            "Vector store initialized ({} dimensions)",
            store.vector_dimension()
        );
        Ok(store)
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Dimension of the vector column
    #[inline]
    pub fn vector_dimension(&self) -> usize {
        self.vector_dimension.load(Ordering::SeqCst)
    }

    /// Create the table if missing, otherwise adopt its vector dimension
    async fn initialize_table(&self) -> Result<(), CarinaError> {
        if self.table_exists().await? {
            let dimension = self.detect_existing_vector_dimension().await?;
            self.vector_dimension.store(dimension, Ordering::SeqCst);
            debug!("Opened existing {} table ({} dimensions)", self.table_name, dimension);
            return Ok(());
        }

        self.create_table(self.vector_dimension()).await
    }

    async fn table_exists(&self) -> Result<bool, CarinaError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to list tables: {}", e)))?;
        Ok(table_names.contains(&self.table_name))
    }

    async fn create_table(&self, vector_dim: usize) -> Result<(), CarinaError> {
        info!(
            "Creating {} table with {} dimensions",
            self.table_name, vector_dim
        );
        self.connection
            .create_empty_table(&self.table_name, create_schema(vector_dim))
            .execute()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to create table: {}", e)))?;

        self.vector_dimension.store(vector_dim, Ordering::SeqCst);
        Ok(())
    }

    async fn drop_table_if_exists(&self) -> Result<(), CarinaError> {
        if self.table_exists().await? {
            debug!("Dropping {} table", self.table_name);
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| CarinaError::Database(format!("Failed to drop table: {}", e)))?;
        }
        Ok(())
    }

    /// Detect vector dimension from existing table schema
    async fn detect_existing_vector_dimension(&self) -> Result<usize, CarinaError> {
        let schema = self
            .open_table()
            .await?
            .schema()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to get table schema: {}", e)))?;

        schema
            .fields()
            .iter()
            .find(|field| field.name() == "vector")
            .and_then(|field| match field.data_type() {
                DataType::FixedSizeList(_, size) => usize::try_from(*size).ok(),
                _ => None,
            })
            .ok_or_else(|| {
                CarinaError::Database(
                    "Could not find vector column or determine dimension".to_string(),
                )
            })
    }

    async fn open_table(&self) -> Result<Table, CarinaError> {
        self.connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to open table: {}", e)))
    }

    /// Delete every stored record
    #[inline]
    pub async fn reset(&self) -> Result<(), CarinaError> {
        info!("Clearing {} table", self.table_name);
        self.drop_table_if_exists().await?;
        self.create_table(self.vector_dimension()).await
    }

    /// Number of stored records
    #[inline]
    pub async fn count(&self) -> Result<usize, CarinaError> {
        self.open_table()
            .await?
            .count_rows(None)
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to count rows: {}", e)))
    }

    /// Embed `chunks` and append them to the table
    ///
    /// # Returns
    /// * `Result<usize, CarinaError>` - Number of inserted records
    ///
    /// # Errors
    /// * `CarinaError::Embedding` if the embedder fails
    /// * `CarinaError::Database` if the vectors do not fit a non-empty table
    #[inline]
    pub async fn upsert(&self, chunks: &[DocumentChunk]) -> Result<usize, CarinaError> {
        if chunks.is_empty() {
            debug!("No chunks to store");
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embed_texts(texts).await?;

        let vector_dim = vectors.first().map_or(0, Vec::len);
        if vector_dim == 0 || vectors.iter().any(|v| v.len() != vector_dim) {
            return Err(CarinaError::Embedding(
                "Embedder returned vectors of inconsistent dimension".to_string(),
            ));
        }
        self.ensure_dimension(vector_dim).await?;

        let created_at = Utc::now().to_rfc3339();
        let records: Vec<StoredRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| StoredRecord {
                id: uuid::Uuid::new_v4().to_string(),
                vector,
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                created_at: created_at.clone(),
            })
            .collect();

        let record_batch = create_record_batch(&records, vector_dim)?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        self.open_table()
            .await?
            .add(reader)
            .execute()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to insert records: {}", e)))?;

        debug!("Stored {} records", records.len());
        Ok(records.len())
    }

    /// Adopt `vector_dim` if the table is still empty, otherwise require a match
    async fn ensure_dimension(&self, vector_dim: usize) -> Result<(), CarinaError> {
        let current = self.vector_dimension();
        if current == vector_dim {
            return Ok(());
        }

        if self.count().await? > 0 {
            return Err(CarinaError::Database(format!(
                "Vector dimension mismatch: table holds {} dimensions, embedder produced {}",
                current, vector_dim
            )));
        }

        warn!(
            "Embedder produces {} dimensions, not {}; recreating empty table",
            vector_dim, current
        );
        self.drop_table_if_exists().await?;
        self.create_table(vector_dim).await
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, CarinaError> {
        let expected = texts.len();
        let embedder = Arc::clone(&self.embedder);
        let vectors = tokio::task::spawn_blocking(move || embedder.embed_batch(&texts))
            .await
            .map_err(|e| CarinaError::Embedding(format!("Embedding task failed: {}", e)))?
            .map_err(|e| CarinaError::Embedding(format!("{:#}", e)))?;

        if vectors.len() != expected {
            return Err(CarinaError::Embedding(format!(
                "Expected {} embeddings, got {}",
                expected,
                vectors.len()
            )));
        }
        Ok(vectors)
    }

    /// Find the records most similar to `query`
    ///
    /// Results are sorted by descending similarity, hold at most `k` entries
    /// and none scores below `threshold`. An empty table yields no results
    /// without embedding the query.
    #[inline]
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>, CarinaError> {
        if self.nothing_to_search(k).await? {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embed_texts(vec![query.to_string()])
            .await?
            .pop()
            .ok_or_else(|| CarinaError::Embedding("No embedding for query".to_string()))?;

        self.nearest(&query_vector, k, threshold).await
    }

    /// Same as [`VectorStore::search`] with a precomputed query vector
    #[inline]
    pub async fn search_by_vector(
        &self,
        query_vector: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>, CarinaError> {
        if self.nothing_to_search(k).await? {
            return Ok(Vec::new());
        }

        self.nearest(query_vector, k, threshold).await
    }

    async fn nothing_to_search(&self, k: usize) -> Result<bool, CarinaError> {
        if k == 0 || self.count().await? == 0 {
            debug!("Skipping search: nothing to return");
            return Ok(true);
        }
        Ok(false)
    }

    /// Query the table, which must hold rows, for the `k` nearest vectors
    async fn nearest(
        &self,
        query_vector: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>, CarinaError> {
        debug!("Searching for similar vectors with limit: {}", k);

        let dimension = self.vector_dimension();
        if query_vector.len() != dimension {
            return Err(CarinaError::Database(format!(
                "Query vector has {} dimensions, table holds {}",
                query_vector.len(),
                dimension
            )));
        }

        let mut results = self
            .open_table()
            .await?
            .vector_search(query_vector)
            .map_err(|e| CarinaError::Database(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to execute search: {}", e)))?;

        let mut search_results = Vec::new();
        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| CarinaError::Database(format!("Failed to read result stream: {}", e)))?
        {
            search_results.extend(parse_search_batch(&batch)?);
        }

        search_results.retain(|result| result.similarity_score >= threshold);
        search_results.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        search_results.truncate(k);

        debug!(
            "{} results at or above similarity {}",
            search_results.len(),
            threshold
        );
        Ok(search_results)
    }
}

/// Create schema with the specified vector dimension
fn create_schema(vector_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, false)),
                vector_dim as i32,
            ),
            false,
        ),
        Field::new("content", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("page_number", DataType::UInt32, false),
        Field::new("chunk_index", DataType::UInt32, false),
        Field::new("token_count", DataType::UInt32, false),
        Field::new("created_at", DataType::Utf8, false),
    ]))
}

fn create_record_batch(
    records: &[StoredRecord],
    vector_dim: usize,
) -> Result<RecordBatch, CarinaError> {
    let flat_values: Vec<f32> = records
        .iter()
        .flat_map(|record| record.vector.iter().copied())
        .collect();
    let field = Arc::new(Field::new("item", DataType::Float32, false));
    let vector_array = FixedSizeListArray::try_new(
        field,
        vector_dim as i32,
        Arc::new(Float32Array::from(flat_values)),
        None,
    )
    .map_err(|e| CarinaError::Database(format!("Failed to create vector array: {}", e)))?;

    let arrays: Vec<Arc<dyn Array>> = vec![
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.id.as_str()),
        )),
        Arc::new(vector_array),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.content.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.metadata.source.as_str()),
        )),
        Arc::new(UInt32Array::from_iter_values(
            records.iter().map(|r| r.metadata.page_number),
        )),
        Arc::new(UInt32Array::from_iter_values(
            records.iter().map(|r| r.metadata.chunk_index),
        )),
        Arc::new(UInt32Array::from_iter_values(
            records.iter().map(|r| r.metadata.token_count),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.created_at.as_str()),
        )),
    ];

    RecordBatch::try_new(create_schema(vector_dim), arrays)
        .map_err(|e| CarinaError::Database(format!("Failed to create record batch: {}", e)))
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, CarinaError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| CarinaError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| CarinaError::Database(format!("Invalid {} column type", name)))
}

/// Parse a single record batch from search results
fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>, CarinaError> {
    let ids = column::<StringArray>(batch, "id")?;
    let vectors = column::<FixedSizeListArray>(batch, "vector")?;
    let contents = column::<StringArray>(batch, "content")?;
    let sources = column::<StringArray>(batch, "source")?;
    let page_numbers = column::<UInt32Array>(batch, "page_number")?;
    let chunk_indices = column::<UInt32Array>(batch, "chunk_index")?;
    let token_counts = column::<UInt32Array>(batch, "token_count")?;
    let created_ats = column::<StringArray>(batch, "created_at")?;
    let distances = column::<Float32Array>(batch, "_distance")?;

    (0..batch.num_rows())
        .map(|row| {
            let vector_values = vectors.value(row);
            let vector = vector_values
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| CarinaError::Database("Invalid vector item type".to_string()))?
                .values()
                .to_vec();

            if distances.is_null(row) {
                return Err(CarinaError::Database(format!(
                    "Search result {} has no distance",
                    ids.value(row)
                )));
            }
            let distance = distances.value(row);

            Ok(SearchResult {
                record: StoredRecord {
                    id: ids.value(row).to_string(),
                    vector,
                    content: contents.value(row).to_string(),
                    metadata: ChunkMetadata {
                        source: sources.value(row).to_string(),
                        page_number: page_numbers.value(row),
                        chunk_index: chunk_indices.value(row),
                        token_count: token_counts.value(row),
                    },
                    created_at: created_ats.value(row).to_string(),
                },
                similarity_score: 1.0 - distance,
                distance,
            })
        })
        .collect()
}
