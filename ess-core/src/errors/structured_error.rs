/// Structured-data collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuredDataError {
    #[error("structured data backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("query failed: {reason}")]
    Query { reason: String },

    #[error("schema introspection failed: {reason}")]
    Schema { reason: String },
}
