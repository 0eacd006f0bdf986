use serde::{Deserialize, Serialize};

/// One retrieved policy passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHit {
    pub content: String,
    pub score: f32,
    #[serde(default)]
    pub source: Option<String>,
}

impl DocumentHit {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            score,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Passages found for a search phrase, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub phrase: String,
    pub hits: Vec<DocumentHit>,
}

impl DocumentResult {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Passages separated by blank lines, for prompts.
    pub fn render(&self) -> String {
        self.hits
            .iter()
            .map(|h| h.content.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
