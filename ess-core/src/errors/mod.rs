mod document_error;
mod generation_error;
mod stage_error;
mod structured_error;

pub use document_error::DocumentIndexError;
pub use generation_error::GenerationError;
pub use stage_error::{StageError, StageErrorKind};
pub use structured_error::StructuredDataError;

/// Errors that abort a request or fail construction. Collaborator failures
/// during a request are never returned through this type; they are recorded
/// on the request state as [`StageError`]s.
#[derive(Debug, thiserror::Error)]
pub enum EssError {
    #[error("caller context is missing")]
    MissingCallerContext,

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("session id is empty")]
    EmptySessionId,

    #[error("request cancelled before stage {stage}")]
    Cancelled { stage: String },

    #[error("request deadline exceeded before stage {stage}")]
    DeadlineExceeded { stage: String },

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    StructuredData(#[from] StructuredDataError),

    #[error(transparent)]
    DocumentIndex(#[from] DocumentIndexError),
}

impl EssError {
    /// Whether this error came from request validation or cancellation rather
    /// than from setup.
    pub fn is_request_abort(&self) -> bool {
        matches!(
            self,
            Self::MissingCallerContext
                | Self::EmptyQuestion
                | Self::EmptySessionId
                | Self::Cancelled { .. }
                | Self::DeadlineExceeded { .. }
        )
    }
}

pub type EssResult<T> = Result<T, EssError>;
