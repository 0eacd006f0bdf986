//! Span definitions per pipeline stage. Every span carries the request id.

/// Span around one whole request.
#[macro_export]
macro_rules! request_span {
    ($request_id:expr, $session_id:expr, $role:expr) => {
        tracing::info_span!("ess.request", request_id = %$request_id, session_id = %$session_id, role = %$role)
    };
}

/// Create a classification span.
#[macro_export]
macro_rules! classify_span {
    ($request_id:expr) => {
        tracing::info_span!("ess.classify", request_id = %$request_id)
    };
}

/// Create a structured-query span.
#[macro_export]
macro_rules! structured_span {
    ($request_id:expr, $path:expr) => {
        tracing::info_span!("ess.structured", request_id = %$request_id, path = ?$path)
    };
}

/// Create a document-lookup span.
#[macro_export]
macro_rules! documents_span {
    ($request_id:expr, $path:expr) => {
        tracing::info_span!("ess.documents", request_id = %$request_id, path = ?$path)
    };
}

/// Create a fusion span.
#[macro_export]
macro_rules! fuse_span {
    ($request_id:expr, $path:expr) => {
        tracing::info_span!("ess.fuse", request_id = %$request_id, path = ?$path)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const REQUEST: &str = "ess.request";
    pub const CLASSIFY: &str = "ess.classify";
    pub const STRUCTURED: &str = "ess.structured";
    pub const DOCUMENTS: &str = "ess.documents";
    pub const FUSE: &str = "ess.fuse";
}
