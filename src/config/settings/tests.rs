use super::*;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.retrieval.top_k, 4);
    assert!((config.retrieval.similarity_threshold - 0.75).abs() < f32::EPSILON);
    assert_eq!(config.chunking.chunk_size, 800);
    assert_eq!(config.chunking.bottom_lines_to_delete, 3);
    assert_eq!(config.chunking.top_pages_to_skip, 1);
    assert!(!config.demo.initialize_vector_db);
    assert!(config.demo.documents.is_empty());
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.chat_model = "   ".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.batch_size = 1001;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.timeout_secs = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTimeout(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.retrieval.top_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.retrieval.similarity_threshold = 1.5;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.chunking.chunk_size = 8;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidChunkSize(8))
    ));
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");

    let mut config = Config::default();
    config.ollama.protocol = "https".to_string();
    config.ollama.host = "secure.example.com".to_string();
    config.ollama.port = 443;
    let url = config
        .ollama_url()
        .expect("should generate https url successfully");
    assert_eq!(url.as_str(), "https://secure.example.com/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config.demo, parsed_config.demo);
    assert_eq!(config.ollama, parsed_config.ollama);
    assert_eq!(config.chunking, parsed_config.chunking);
}

#[test]
fn partial_config_uses_defaults() {
    let config = Config::from_toml_str(
        r#"
        [demo]
        initialize_vector_db = true
        documents = ["docs/faq.pdf"]

        [ollama]
        chat_model = "mistral:latest"
        "#,
    )
    .expect("partial config should parse");

    assert!(config.demo.initialize_vector_db);
    assert_eq!(config.demo.documents, vec![PathBuf::from("docs/faq.pdf")]);
    assert_eq!(config.ollama.chat_model, "mistral:latest");
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.retrieval.top_k, 4);
    assert_eq!(config.data_dir, PathBuf::from("data"));
}

#[test]
fn camel_case_demo_keys_are_accepted() {
    let config = Config::from_toml_str(
        r#"
        [demo]
        initializeVectorDb = true
        qaSystemPrompt = "prompts/qa.st"
        chatbotSystemPrompt = "prompts/chatbot.st"
        documents = ["a.pdf", "b.pdf"]
        "#,
    )
    .expect("camelCase keys should parse");

    assert!(config.demo.initialize_vector_db);
    assert_eq!(config.demo.qa_system_prompt, PathBuf::from("prompts/qa.st"));
    assert_eq!(
        config.demo.chatbot_system_prompt,
        PathBuf::from("prompts/chatbot.st")
    );
    assert_eq!(config.demo.documents.len(), 2);
}

#[test]
fn invalid_toml_handling() {
    let result = Config::from_toml_str(
        r#"
        [ollama
        host = "localhost"
        "#,
    );
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn load_missing_config_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("carina.toml");

    let config = Config::load(&config_path).expect("missing config should load defaults");

    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.data_path(), temp_dir.path().join("data"));
}

#[test]
fn load_resolves_relative_paths_against_config_dir() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("carina.toml");
    fs::write(
        &config_path,
        r#"
        data_dir = "state"

        [demo]
        qa_system_prompt = "prompts/qa.st"
        documents = ["docs/one.pdf", "/abs/two.pdf"]
        "#,
    )
    .expect("should write config");

    let config = Config::load(&config_path).expect("config should load");

    assert_eq!(
        config.qa_system_prompt_path(),
        temp_dir.path().join("prompts/qa.st")
    );
    assert_eq!(
        config.document_paths(),
        vec![
            temp_dir.path().join("docs/one.pdf"),
            PathBuf::from("/abs/two.pdf"),
        ]
    );
    assert_eq!(
        config.database_path(),
        temp_dir.path().join("state").join("metadata.db")
    );
    assert_eq!(
        config.vector_database_path(),
        temp_dir.path().join("state").join("vectors")
    );
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("carina.toml");
    fs::write(
        &config_path,
        r#"
        [retrieval]
        top_k = 500
        "#,
    )
    .expect("should write config");

    assert!(Config::load(&config_path).is_err());
}

#[test]
fn bare_file_name_resolves_against_current_dir() {
    let config = Config::load("does-not-exist.toml").expect("defaults should load");
    assert_eq!(config.get_base_dir(), Path::new("."));
}

#[test]
fn error_display_messages() {
    let errors = vec![
        ConfigError::InvalidProtocol("ftp".to_string()),
        ConfigError::InvalidPort(0),
        ConfigError::InvalidBatchSize(0),
        ConfigError::InvalidModel(String::new()),
        ConfigError::InvalidUrl("invalid-url".to_string()),
        ConfigError::InvalidSimilarityThreshold(2.0),
    ];

    for error in errors {
        let message = format!("{error}");
        assert!(message.len() > 10);
    }
}
