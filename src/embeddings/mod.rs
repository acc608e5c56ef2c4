// Embeddings module
// The Embedder seam and the Ollama client that implements it

pub mod ollama;

use anyhow::Result;

pub use ollama::OllamaClient;

/// Turns text into embedding vectors
///
/// Implementations are blocking. Every vector returned by one embedder must
/// have the same dimension.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
