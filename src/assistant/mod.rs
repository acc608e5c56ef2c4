// Assistant module
// Builds the system + user prompt, optionally stuffed with retrieved documents


pub mod template;

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::llm::{ChatModel, Message, Prompt};
use crate::retriever::DocumentRetriever;
use crate::{CarinaError, Result};

pub use template::SystemPromptTemplate;

/// Placeholder the QA template receives the retrieved documents through
pub const DOCUMENTS_PLACEHOLDER: &str = "documents";

/// Answers questions with a chat model, optionally grounded in retrieved documents
#[derive(Debug)]
pub struct Assistant<R, C> {
    retriever: R,
    chat_model: Arc<C>,
    qa_template: SystemPromptTemplate,
    chatbot_template: SystemPromptTemplate,
}

impl<R, C> Assistant<R, C>
where
    R: DocumentRetriever,
    C: ChatModel + 'static,
{
    #[inline]
    pub fn new(
        retriever: R,
        chat_model: C,
        qa_template: SystemPromptTemplate,
        chatbot_template: SystemPromptTemplate,
    ) -> Self {
        if !qa_template.has_placeholder(DOCUMENTS_PLACEHOLDER) {
            warn!(
                "QA system prompt has no {{{}}} placeholder; retrieved documents will not reach the model",
                DOCUMENTS_PLACEHOLDER
            );
        }

        Self {
            retriever,
            chat_model: Arc::new(chat_model),
            qa_template,
            chatbot_template,
        }
    }

    #[inline]
    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    #[inline]
    pub fn chat_model(&self) -> &C {
        &self.chat_model
    }

    /// Answer `question`, returning the model's reply verbatim
    ///
    /// With `stuff` the QA template is filled with the retrieved documents,
    /// one per line in similarity order. Without it the chatbot template is
    /// used as is and nothing is retrieved.
    ///
    /// # Errors
    /// * Retrieval errors are passed through
    /// * `CarinaError::Llm` if the chat call fails or returns no generation
    #[inline]
    pub async fn generate(&self, question: &str, stuff: bool) -> Result<String> {
        let system_message = self.system_message(question, stuff).await?;
        let prompt = Prompt::new(vec![system_message, Message::user(question)]);

        debug!("Asking chat model to reply to question");
        let chat_model = Arc::clone(&self.chat_model);
        let generation = tokio::task::spawn_blocking(move || chat_model.generate(&prompt))
            .await
            .map_err(|e| CarinaError::Llm(format!("Chat task failed: {}", e)))?
            .map_err(|e| CarinaError::Llm(format!("{:#}", e)))?
            .ok_or_else(|| CarinaError::Llm("Chat model returned no generation".to_string()))?;
        debug!("Chat model responded");

        Ok(generation)
    }

    /// Build the system message for `question`
    #[inline]
    pub async fn system_message(&self, question: &str, stuff: bool) -> Result<Message> {
        if !stuff {
            info!("Not stuffing the prompt, using generic prompt");
            return Ok(Message::system(self.chatbot_template.render(&[])));
        }

        debug!("Retrieving relevant documents");
        let similar_documents = self.retriever.retrieve(question).await?;
        debug!("Found {} relevant documents", similar_documents.len());

        let documents = similar_documents
            .iter()
            .map(|result| result.record.content.as_str())
            .join("\n");

        Ok(Message::system(
            self.qa_template
                .render(&[(DOCUMENTS_PLACEHOLDER, documents.as_str())]),
        ))
    }
}
