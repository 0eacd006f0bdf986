use serde::{Deserialize, Serialize};

use super::{DocumentIndexError, GenerationError, StructuredDataError};

/// The failure taxonomy recorded on a request while it moves through the
/// stages. None of these abort a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageErrorKind {
    GenerationUnavailable,
    StructuredDataUnavailable,
    DocumentIndexUnavailable,
    AccessDenied,
    MalformedGeneratorOutput,
}

impl StageErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerationUnavailable => "generation_unavailable",
            Self::StructuredDataUnavailable => "structured_data_unavailable",
            Self::DocumentIndexUnavailable => "document_index_unavailable",
            Self::AccessDenied => "access_denied",
            Self::MalformedGeneratorOutput => "malformed_generator_output",
        }
    }
}

impl std::fmt::Display for StageErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure recorded on the request state. `detail` is for logs only and is
/// never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct StageError {
    pub kind: StageErrorKind,
    pub detail: String,
}

impl StageError {
    pub fn new(kind: StageErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(StageErrorKind::MalformedGeneratorOutput, detail)
    }
}

impl From<GenerationError> for StageError {
    fn from(err: GenerationError) -> Self {
        Self::new(StageErrorKind::GenerationUnavailable, err.to_string())
    }
}

impl From<StructuredDataError> for StageError {
    fn from(err: StructuredDataError) -> Self {
        let kind = match err {
            StructuredDataError::Unavailable { .. } | StructuredDataError::Schema { .. } => {
                StageErrorKind::StructuredDataUnavailable
            }
            // A query the backend refused to run came from the generator.
            StructuredDataError::Query { .. } => StageErrorKind::MalformedGeneratorOutput,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<DocumentIndexError> for StageError {
    fn from(err: DocumentIndexError) -> Self {
        Self::new(StageErrorKind::DocumentIndexUnavailable, err.to_string())
    }
}
