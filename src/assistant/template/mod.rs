#[cfg(test)]
mod tests;

use std::path::Path;

use tracing::debug;

use crate::Result;

/// System prompt text with `{name}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPromptTemplate {
    template: String,
}

impl SystemPromptTemplate {
    #[inline]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Read a template file
    ///
    /// # Errors
    /// * `CarinaError::Io` naming the file if it cannot be read
    #[inline]
    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to read prompt template {}: {}", path.display(), e),
            )
        })?;
        debug!("Loaded prompt template {}", path.display());
        Ok(Self::new(template))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    #[inline]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.template.contains(&format!("{{{name}}}"))
    }

    /// Substitute every `{name}` with its value; unknown placeholders are kept
    #[inline]
    pub fn render(&self, variables: &[(&str, &str)]) -> String {
        variables
            .iter()
            .fold(self.template.clone(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}
