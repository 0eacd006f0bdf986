/// Text-generation collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation provider unavailable: {provider}: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("generation provider rejected the request: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("generation provider returned an empty response: {provider}")]
    EmptyResponse { provider: String },
}
