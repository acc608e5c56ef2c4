// Configuration management module
// TOML settings for the demo runner, Ollama, retrieval and chunking

pub mod settings;
pub mod show;

pub use settings::{
    Config, ConfigError, DEFAULT_CONFIG_FILE, DemoConfig, OllamaConfig, RetrievalConfig,
};
pub use show::show_config;
