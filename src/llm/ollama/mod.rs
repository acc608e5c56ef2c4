
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, Message, Prompt};
use crate::embeddings::OllamaClient;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<Message>,
}

impl ChatModel for OllamaClient {
    fn generate(&self, prompt: &Prompt) -> Result<Option<String>> {
        let request = ChatRequest {
            model: self.chat_model(),
            messages: &prompt.messages,
            stream: false,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;

        debug!(
            "Sending {} messages to chat model {}",
            prompt.messages.len(),
            self.chat_model()
        );

        let response_text = self
            .post_chat(&request_json)
            .context("Failed to generate chat completion")?;
        let response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        Ok(response.message.map(|message| message.content))
    }
}
