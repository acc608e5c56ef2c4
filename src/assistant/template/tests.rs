use super::*;
use crate::CarinaError;
use tempfile::TempDir;

#[test]
fn renders_documents_placeholder() {
    let template = SystemPromptTemplate::new("Use these documents:\n{documents}\nBe brief.");

    assert!(template.has_placeholder("documents"));
    assert_eq!(
        template.render(&[("documents", "Carina is a healthcare marketplace.")]),
        "Use these documents:\nCarina is a healthcare marketplace.\nBe brief."
    );
}

#[test]
fn template_without_placeholders_renders_verbatim() {
    let template = SystemPromptTemplate::new("You are a friendly chatbot.");

    assert!(!template.has_placeholder("documents"));
    assert_eq!(template.render(&[]), "You are a friendly chatbot.");
    assert_eq!(
        template.render(&[("documents", "ignored")]),
        "You are a friendly chatbot."
    );
}

#[test]
fn repeated_placeholders_are_all_replaced() {
    let template = SystemPromptTemplate::new("{documents}|{documents}|{other}");

    assert_eq!(template.render(&[("documents", "x")]), "x|x|{other}");
}

#[test]
fn loads_from_file() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("qa.st");
    std::fs::write(&path, "Context: {documents}").expect("should write template");

    let template = SystemPromptTemplate::from_file(&path).expect("template should load");

    assert_eq!(template.as_str(), "Context: {documents}");
}

#[test]
fn missing_file_names_the_path() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = dir.path().join("missing.st");

    match SystemPromptTemplate::from_file(&path) {
        Err(CarinaError::Io(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            assert!(e.to_string().contains("missing.st"));
        }
        other => panic!("expected io error, got {other:?}"),
    }
}
