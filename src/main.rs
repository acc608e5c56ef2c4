use std::path::PathBuf;

use clap::{Parser, Subcommand};
use carina_rag::Result;
use carina_rag::commands::compose;
use carina_rag::config::{Config, DEFAULT_CONFIG_FILE, show_config};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "carina")]
#[command(about = "Answer questions about Carina from PDF documents with a local Ollama model")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, env = "CARINA_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the startup routine (default)
    Demo,
    /// Reset the vector store and load the configured documents
    Ingest,
    /// Ask a single question
    Ask {
        /// The question to answer
        question: String,
        /// Answer without retrieved documents
        #[arg(long)]
        no_stuff: bool,
    },
    /// Show vector store, ledger and Ollama status
    Status,
    /// Check the configuration file
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Config { show } => {
            if show {
                show_config(&config);
            } else {
                println!("Configuration at {} is valid", cli.config.display());
            }
        }
        Commands::Demo => {
            compose(config).await?.demo().await?;
        }
        Commands::Ingest => {
            compose(config).await?.ingest().await?;
        }
        Commands::Ask { question, no_stuff } => {
            compose(config).await?.ask(&question, !no_stuff).await?;
        }
        Commands::Status => {
            compose(config).await?.status().await?;
        }
    }

    Ok(())
}
