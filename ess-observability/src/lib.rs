//! # ess-observability
//!
//! Tracing setup, stage spans and structured events, the bounded request
//! log, collaborator degradation tracking, and health reporting.

pub mod degradation;
pub mod health;
pub mod request_log;
pub mod tracing_setup;

pub use degradation::{DegradationEvent, DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use health::{CollaboratorHealth, CollaboratorStatus, HealthReport, HealthReporter, HealthSnapshot, HealthStatus};
pub use request_log::{RequestLog, RequestLogEntry, RequestOutcome};

/// Component names used for degradation tracking and health reports.
pub mod components {
    pub const GENERATION: &str = "generation";
    pub const STRUCTURED_DATA: &str = "structured_data";
    pub const DOCUMENT_INDEX: &str = "document_index";
}
