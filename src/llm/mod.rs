// Chat model module
// Prompt types and the ChatModel seam used by the assistant

pub mod ollama;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[inline]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Ordered messages sent to a chat model in one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub messages: Vec<Message>,
}

impl Prompt {
    #[inline]
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Blocking chat completion
pub trait ChatModel: Send + Sync {
    /// Generate a reply to `prompt`; `Ok(None)` means the model produced no generation
    fn generate(&self, prompt: &Prompt) -> Result<Option<String>>;
}
