
use super::ChunkingConfig;

/// Cleanup applied to the raw text of each extracted page
///
/// Runs of blank lines collapse into one and leading/trailing blank lines are
/// dropped on every page. Line deletion only starts once `top_pages_to_skip`
/// pages have gone by, so a cover page keeps its full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTextFormatter {
    pub top_pages_to_skip: usize,
    pub top_lines_to_delete: usize,
    pub bottom_lines_to_delete: usize,
}

impl Default for PageTextFormatter {
    #[inline]
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

impl PageTextFormatter {
    #[inline]
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self {
            top_pages_to_skip: config.top_pages_to_skip,
            top_lines_to_delete: config.top_lines_to_delete,
            bottom_lines_to_delete: config.bottom_lines_to_delete,
        }
    }

    /// Format the text of the page at the 0-based `page_index`
    #[inline]
    pub fn format(&self, text: &str, page_index: usize) -> String {
        let lines = collapse_blank_lines(text);

        if page_index < self.top_pages_to_skip {
            return lines.join("\n");
        }

        let end = lines.len().saturating_sub(self.bottom_lines_to_delete);
        let start = self.top_lines_to_delete.min(end);
        lines[start..end].join("\n")
    }
}

fn collapse_blank_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    // Starting "blank" drops leading blank lines
    let mut previous_blank = true;

    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.trim_start().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line });
        previous_blank = blank;
    }

    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    lines
}
