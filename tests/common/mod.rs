// Shared fixtures for integration tests

#![allow(dead_code, reason = "each test binary uses a different subset")]

#[path = "../../src/test_support/fixtures.rs"]
mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use carina_rag::config::Config;
use carina_rag::embeddings::Embedder;
use carina_rag::llm::{ChatModel, Prompt};

pub use fixtures::{KEYWORD_DIMENSION, KeywordEmbedder, build_pdf};

pub const QA_TEMPLATE: &str = "You answer questions about Carina.\n\
     Use the information in the DOCUMENTS section.\n\
     DOCUMENTS:\n{documents}";
pub const CHATBOT_TEMPLATE: &str = "You are a helpful assistant.";

/// Write a PDF with one page per entry, each line drawn in 12pt Helvetica
pub fn write_pdf(path: &Path, pages: &[&[&str]]) {
    std::fs::write(path, build_pdf(pages)).expect("should write pdf");
}

/// Config rooted at `dir` with prompt templates written next to it
pub fn test_config(dir: &Path, documents: Vec<PathBuf>, initialize: bool) -> Config {
    std::fs::create_dir_all(dir.join("prompts")).expect("should create prompts dir");
    std::fs::write(dir.join("prompts/qa-system-prompt.st"), QA_TEMPLATE)
        .expect("should write qa template");
    std::fs::write(dir.join("prompts/chatbot-system-prompt.st"), CHATBOT_TEMPLATE)
        .expect("should write chatbot template");

    let mut config = Config {
        base_dir: dir.to_path_buf(),
        ..Config::default()
    };
    config.ollama.embedding_dimension = KEYWORD_DIMENSION as u32;
    config.demo.initialize_vector_db = initialize;
    config.demo.documents = documents;
    config
}

/// Chat model that records every prompt and answers with a fixed reply
#[derive(Debug)]
pub struct RecordingChatModel {
    reply: String,
    prompts: Mutex<Vec<Prompt>>,
}

impl RecordingChatModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
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
        Ok(Some(self.reply.clone()))
    }
}
