// Fixtures shared by unit tests: a minimal PDF writer and deterministic fakes
// for the embedding, chat and retrieval seams

mod fixtures;

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::database::lancedb::{StoredRecord, vector_store::SearchResult};
use crate::embeddings::Embedder;
use crate::llm::{ChatModel, Prompt};
use crate::loader::ChunkMetadata;
use crate::retriever::DocumentRetriever;

pub use fixtures::{KEYWORD_DIMENSION, KeywordEmbedder, build_pdf};

/// Embedder with a fixed output dimension, for schema tests
#[derive(Debug)]
pub struct ConstantEmbedder(pub usize);

impl Embedder for ConstantEmbedder {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vector = vec![0.0; self.0];
        vector[0] = 1.0;
        Ok(vector)
    }
}

#[derive(Debug, Default)]
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Err(anyhow::anyhow!("embedding service unavailable"))
    }
}

/// Chat model that records every prompt and answers with a fixed reply
#[derive(Debug)]
pub struct RecordingChatModel {
    reply: Option<String>,
    prompts: Mutex<Vec<Prompt>>,
}

impl RecordingChatModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A model that returns no generation
    pub fn silent() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

impl ChatModel for RecordingChatModel {
    fn generate(&self, prompt: &Prompt) -> anyhow::Result<Option<String>> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.clone());
        Ok(self.reply.clone())
    }
}

#[derive(Debug, Default)]
pub struct FailingChatModel;

impl ChatModel for FailingChatModel {
    fn generate(&self, _prompt: &Prompt) -> anyhow::Result<Option<String>> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

pub fn search_result(content: &str, similarity_score: f32) -> SearchResult {
    SearchResult {
        record: StoredRecord {
            id: uuid::Uuid::new_v4().to_string(),
            vector: Vec::new(),
            content: content.to_string(),
            metadata: ChunkMetadata {
                source: "carina.pdf".to_string(),
                page_number: 1,
                chunk_index: 0,
                token_count: 0,
            },
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
        similarity_score,
        distance: 1.0 - similarity_score,
    }
}

/// Retriever returning canned documents and counting calls
#[derive(Debug, Default)]
pub struct CountingRetriever {
    documents: Vec<String>,
    calls: AtomicUsize,
}

impl CountingRetriever {
    pub fn new(documents: &[&str]) -> Self {
        Self {
            documents: documents.iter().map(ToString::to_string).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentRetriever for CountingRetriever {
    async fn retrieve(&self, _query: &str) -> crate::Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .documents
            .iter()
            .map(|content| search_result(content, 0.9))
            .collect())
    }
}
