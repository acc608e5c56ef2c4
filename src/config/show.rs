use console::style;

use super::Config;

#[inline]
pub fn show_config(config: &Config) {
    println!("{}", style("📋 Current Configuration").bold().cyan());
    println!();

    println!("{}", style("Demo Settings:").bold().yellow());
    println!(
        "  Initialize Vector DB: {}",
        style(config.demo.initialize_vector_db).cyan()
    );
    println!(
        "  QA System Prompt: {}",
        style(config.qa_system_prompt_path().display()).cyan()
    );
    println!(
        "  Chatbot System Prompt: {}",
        style(config.chatbot_system_prompt_path().display()).cyan()
    );
    if config.demo.documents.is_empty() {
        println!("  Documents: {}", style("none").dim());
    } else {
        println!("  Documents:");
        for path in config.document_paths() {
            println!("    - {}", style(path.display()).cyan());
        }
    }

    println!();
    println!("{}", style("Ollama Settings:").bold().yellow());
    match config.ollama_url() {
        Ok(url) => println!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => println!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }
    println!(
        "  Embedding Model: {}",
        style(&config.ollama.embedding_model).cyan()
    );
    println!("  Chat Model: {}", style(&config.ollama.chat_model).cyan());
    println!("  Batch Size: {}", style(config.ollama.batch_size).cyan());
    println!(
        "  Timeouts: {}s embeddings, {}s chat",
        style(config.ollama.timeout_secs).cyan(),
        style(config.ollama.chat_timeout_secs).cyan()
    );

    println!();
    println!("{}", style("Retrieval Settings:").bold().yellow());
    println!("  Top K: {}", style(config.retrieval.top_k).cyan());
    println!(
        "  Similarity Threshold: {}",
        style(config.retrieval.similarity_threshold).cyan()
    );

    println!();
    println!("{}", style("Chunking Settings:").bold().yellow());
    println!(
        "  Chunk Size: {} tokens",
        style(config.chunking.chunk_size).cyan()
    );
    println!(
        "  Footer Lines Removed: {} (after the first {} page(s))",
        style(config.chunking.bottom_lines_to_delete).cyan(),
        style(config.chunking.top_pages_to_skip).cyan()
    );

    println!();
    println!("Data directory: {}", style(config.data_path().display()).dim());
}
