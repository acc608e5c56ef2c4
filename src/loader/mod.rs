// Document loader module
// Reads PDFs page by page, cleans page text and splits it into token-bounded chunks


pub mod formatter;
pub mod splitter;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{CarinaError, Result};

pub use formatter::PageTextFormatter;
pub use splitter::{TokenCounter, TokenSplitter};

/// Configuration for page cleanup and chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in cl100k_base tokens
    pub chunk_size: usize,
    /// Chunks with this many characters or fewer are not embedded
    pub min_chunk_length: usize,
    /// Number of leading pages exempt from line deletion
    pub top_pages_to_skip: usize,
    /// Lines removed from the top of each non-exempt page
    pub top_lines_to_delete: usize,
    /// Lines removed from the bottom of each non-exempt page (footers)
    pub bottom_lines_to_delete: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 800,
            min_chunk_length: 5,
            top_pages_to_skip: 1,
            top_lines_to_delete: 0,
            bottom_lines_to_delete: 3,
        }
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name of the source document
    pub source: String,
    /// 1-based page number within the source document
    pub page_number: u32,
    /// Index of this chunk within its page
    pub chunk_index: u32,
    /// Token count of the chunk text
    pub token_count: u32,
}

/// A chunk of page text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Cleaned text of a single PDF page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    pub page_number: u32,
    pub text: String,
}

/// A loaded PDF: one cleaned document per non-blank page
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub path: PathBuf,
    pub source: String,
    pub page_count: usize,
    pub pages: Vec<PageDocument>,
}

impl PdfDocument {
    /// Split every page into chunks.
    ///
    /// The iterator is lazy and can be recreated any number of times; chunks
    /// never carry text across a page boundary.
    #[inline]
    pub fn chunks<'a>(
        &'a self,
        splitter: &'a TokenSplitter,
    ) -> impl Iterator<Item = DocumentChunk> + 'a {
        self.pages.iter().flat_map(move |page| {
            splitter
                .split(&page.text)
                .enumerate()
                .map(move |(index, (content, token_count))| DocumentChunk {
                    content: content.to_string(),
                    metadata: ChunkMetadata {
                        source: self.source.clone(),
                        page_number: page.page_number,
                        chunk_index: index as u32,
                        token_count: token_count as u32,
                    },
                })
        })
    }
}

/// Reads PDF files into per-page documents
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    formatter: PageTextFormatter,
}

impl DocumentLoader {
    #[inline]
    pub fn new(formatter: PageTextFormatter) -> Self {
        Self { formatter }
    }

    #[inline]
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(PageTextFormatter::from_config(config))
    }

    /// Load the PDF at `path`
    ///
    /// # Errors
    /// * `CarinaError::Io` if the file cannot be read
    /// * `CarinaError::Document` if the file is not a parseable PDF
    #[inline]
    pub fn load(&self, path: &Path) -> Result<PdfDocument> {
        debug!("Reading PDF {}", path.display());
        let bytes = std::fs::read(path)?;

        // pdf-extract panics instead of erroring on some malformed inputs
        let extracted =
            panic::catch_unwind(AssertUnwindSafe(|| {
                pdf_extract::extract_text_from_mem_by_pages(&bytes)
            }))
            .map_err(|_| {
                CarinaError::Document(format!("PDF parser aborted on {}", path.display()))
            })?
            .map_err(|e| {
                CarinaError::Document(format!(
                    "Failed to extract text from {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let source = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| {
                name.to_string_lossy().into_owned()
            });

        let document = self.build_document(path, source, &extracted);
        info!(
            "Loaded {} ({} pages, {} with text)",
            document.source,
            document.page_count,
            document.pages.len()
        );
        Ok(document)
    }

    /// Build a document from already extracted page texts
    #[inline]
    pub fn build_document<S: AsRef<str>>(
        &self,
        path: &Path,
        source: String,
        page_texts: &[S],
    ) -> PdfDocument {
        let pages = page_texts
            .iter()
            .enumerate()
            .filter_map(|(index, text)| {
                let text = self.formatter.format(text.as_ref(), index);
                (!text.trim().is_empty()).then(|| PageDocument {
                    page_number: index as u32 + 1,
                    text,
                })
            })
            .collect();

        PdfDocument {
            path: path.to_path_buf(),
            source,
            page_count: page_texts.len(),
            pages,
        }
    }
}
