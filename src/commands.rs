use std::io::Write;
use std::sync::Arc;

use console::style;
use tracing::{info, warn};

use crate::assistant::{Assistant, SystemPromptTemplate};
use crate::config::Config;
use crate::database::lancedb::VectorStore;
use crate::database::sqlite::Database;
use crate::embeddings::{Embedder, OllamaClient};
use crate::indexer::Indexer;
use crate::llm::ChatModel;
use crate::retriever::{DocumentRetriever, VectorStoreRetriever};
use crate::{CarinaError, Result};

/// Question asked by the startup routine
pub const DEMO_QUESTION: &str = "What is Carina?";

pub type OllamaAssistant = Assistant<VectorStoreRetriever, OllamaClient>;

/// Every long-lived component, wired once at startup
#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub client: OllamaClient,
    pub vector_store: Arc<VectorStore>,
    pub database: Database,
    pub indexer: Indexer,
    pub assistant: OllamaAssistant,
}

/// Build the store, retriever and assistant from `config`
///
/// Prompt templates are read here so a missing file fails before any
/// document is touched.
#[inline]
pub async fn compose(config: Config) -> Result<App> {
    let client = OllamaClient::new(&config)
        .map_err(|e| CarinaError::Config(format!("Failed to create Ollama client: {:#}", e)))?;

    let embedder: Arc<dyn Embedder> = Arc::new(client.clone());
    let vector_store = Arc::new(VectorStore::new(&config, embedder).await?);

    let database = Database::initialize_from_data_dir(&config.data_path())
        .await
        .map_err(|e| CarinaError::Database(format!("{:#}", e)))?;

    let indexer = Indexer::from_config(&config, Arc::clone(&vector_store), Some(database.clone()))?;

    let qa_template = SystemPromptTemplate::from_file(&config.qa_system_prompt_path())?;
    let chatbot_template = SystemPromptTemplate::from_file(&config.chatbot_system_prompt_path())?;

    let retriever = VectorStoreRetriever::new(
        Arc::clone(&vector_store),
        config.retrieval.top_k,
        config.retrieval.similarity_threshold,
    );
    let assistant = Assistant::new(retriever, client.clone(), qa_template, chatbot_template);

    Ok(App {
        config,
        client,
        vector_store,
        database,
        indexer,
        assistant,
    })
}

impl App {
    /// Run the startup routine, printing both answers to stdout
    #[inline]
    pub async fn demo(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        run_demo(&self.config, &self.indexer, &self.assistant, &mut stdout).await
    }

    /// Reset the store and load every configured document
    #[inline]
    pub async fn ingest(&self) -> Result<()> {
        reload_documents(&self.config, &self.indexer).await?;
        let count = self.vector_store.count().await?;
        println!(
            "{} {} records in the vector store",
            style("✓").green(),
            count
        );
        Ok(())
    }

    /// Answer a single question
    #[inline]
    pub async fn ask(&self, question: &str, stuff: bool) -> Result<()> {
        let answer = self.assistant.generate(question, stuff).await?;
        println!("{}", style(question).bold());
        println!("{}", answer);
        Ok(())
    }

    /// Report record count, ledger contents and Ollama health
    #[inline]
    pub async fn status(&self) -> Result<()> {
        println!("{}", style("Carina RAG status").bold());
        println!();

        let count = self.vector_store.count().await?;
        println!(
            "Vector store: {} records ({} dimensions)",
            count,
            self.vector_store.vector_dimension()
        );

        let documents = self
            .database
            .list_documents()
            .await
            .map_err(|e| CarinaError::Database(format!("{:#}", e)))?;
        if documents.is_empty() {
            println!("Ingested documents: none");
        } else {
            println!("Ingested documents:");
            for document in &documents {
                println!("  {}", document);
            }
        }

        let client = self.client.clone();
        let health = tokio::task::spawn_blocking(move || client.health_check())
            .await
            .map_err(|e| CarinaError::Network(format!("Health check task failed: {}", e)))?;
        match health {
            Ok(()) => println!(
                "Ollama: {} at {}",
                style("healthy").green(),
                self.client.base_url()
            ),
            Err(e) => {
                warn!("Ollama health check failed: {:#}", e);
                println!(
                    "Ollama: {} at {} ({:#})",
                    style("unavailable").red(),
                    self.client.base_url(),
                    e
                );
            }
        }

        Ok(())
    }
}

async fn reload_documents(config: &Config, indexer: &Indexer) -> Result<()> {
    let documents = config.document_paths();
    if documents.is_empty() {
        warn!("No documents configured; the vector store will be empty");
    }

    info!("Initializing vector store");
    indexer.reset().await?;
    indexer.load_all(&documents).await?;
    info!("Vector store finished initializing");
    Ok(())
}

/// The startup routine
///
/// Optionally repopulates the store, then writes its size as a
/// `records=<count>` line to `out`. Asks [`DEMO_QUESTION`] with and without
/// retrieved context and writes `stuffed=<answer>` and `default=<answer>`
/// lines after it.
#[inline]
pub async fn run_demo<R, C, W>(
    config: &Config,
    indexer: &Indexer,
    assistant: &Assistant<R, C>,
    out: &mut W,
) -> Result<()>
where
    R: DocumentRetriever,
    C: ChatModel + 'static,
    W: Write,
{
    if config.demo.initialize_vector_db {
        reload_documents(config, indexer).await?;
    }

    let count = indexer.vector_store().count().await?;
    info!("there are {} records in the vector store", count);
    writeln!(out, "records={}", count)?;

    let stuffed = assistant.generate(DEMO_QUESTION, true).await?;
    writeln!(out, "stuffed={}", stuffed)?;

    let default = assistant.generate(DEMO_QUESTION, false).await?;
    writeln!(out, "default={}", default)?;

    Ok(())
}
