
use std::fmt;
use std::sync::Arc;

use text_splitter::{ChunkConfig, ChunkSizer, TextSplitter};
use tiktoken_rs::CoreBPE;
use tracing::debug;

use super::ChunkingConfig;
use crate::CarinaError;

/// Token counter backed by the cl100k_base BPE vocabulary
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
}

impl TokenCounter {
    #[inline]
    pub fn cl100k() -> Result<Self, CarinaError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            CarinaError::Config(format!("Failed to load cl100k_base tokenizer: {e}"))
        })?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    #[inline]
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoding", &"cl100k_base")
            .finish()
    }
}

impl ChunkSizer for TokenCounter {
    #[inline]
    fn size(&self, chunk: &str) -> usize {
        self.count(chunk)
    }
}

/// Splits page text into chunks of at most `chunk_size` tokens
///
/// Boundaries are picked by `text-splitter`, which prefers paragraph, sentence
/// and word breaks in that order. Chunks whose trimmed text is no longer than
/// `min_chunk_length` characters are not worth embedding and are skipped.
pub struct TokenSplitter {
    splitter: TextSplitter<TokenCounter>,
    counter: TokenCounter,
    chunk_size: usize,
    min_chunk_length: usize,
}

impl TokenSplitter {
    #[inline]
    pub fn new(chunk_size: usize, min_chunk_length: usize) -> Result<Self, CarinaError> {
        let counter = TokenCounter::cl100k()?;
        let splitter = TextSplitter::new(ChunkConfig::new(chunk_size).with_sizer(counter.clone()));

        debug!(
            "Token splitter ready (chunk size {}, min length {})",
            chunk_size, min_chunk_length
        );

        Ok(Self {
            splitter,
            counter,
            chunk_size,
            min_chunk_length,
        })
    }

    #[inline]
    pub fn from_config(config: &ChunkingConfig) -> Result<Self, CarinaError> {
        Self::new(config.chunk_size, config.min_chunk_length)
    }

    #[inline]
    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Lazily split `text`, yielding each chunk with its token count
    #[inline]
    pub fn split<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        self.splitter
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| chunk.chars().count() > self.min_chunk_length)
            .map(|chunk| (chunk, self.counter.count(chunk)))
    }
}

impl fmt::Debug for TokenSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSplitter")
            .field("chunk_size", &self.chunk_size)
            .field("min_chunk_length", &self.min_chunk_length)
            .finish_non_exhaustive()
    }
}
