/// Document-index collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentIndexError {
    #[error("document index unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("document search failed: {reason}")]
    SearchFailed { reason: String },
}
