use std::fmt;

use serde::{Deserialize, Serialize};

/// Which collaborator(s) a question needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    Structured,
    Document,
    Hybrid,
}

impl ResolutionPath {
    /// Parse a classifier label. Accepts the wire labels DATABASE, POLICY and
    /// HYBRID in any case, tolerating surrounding whitespace, quotes,
    /// backticks and trailing punctuation.
    pub fn from_label(raw: &str) -> Option<Self> {
        let cleaned = raw.trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '*' | '.' | '!' | ':' | ';')
        });
        match cleaned.to_ascii_uppercase().as_str() {
            "DATABASE" => Some(Self::Structured),
            "POLICY" => Some(Self::Document),
            "HYBRID" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// The wire label the classifier is instructed to produce.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structured => "DATABASE",
            Self::Document => "POLICY",
            Self::Hybrid => "HYBRID",
        }
    }

    pub fn needs_structured(&self) -> bool {
        match self {
            Self::Structured | Self::Hybrid => true,
            Self::Document => false,
        }
    }

    pub fn needs_documents(&self) -> bool {
        match self {
            Self::Document | Self::Hybrid => true,
            Self::Structured => false,
        }
    }
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
