//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields. Question
//! text and row contents are never logged.

use uuid::Uuid;

/// Log a finished request.
pub fn request_completed(request_id: Uuid, path: &str, outcome: &str, latency_ms: u64) {
    tracing::info!(
        event = "request_completed",
        request_id = %request_id,
        path = %path,
        outcome = %outcome,
        latency_ms = latency_ms,
        "request completed"
    );
}

/// Log an access denial.
pub fn access_denied(request_id: Uuid, role: &str, reason: &str) {
    tracing::info!(
        event = "access_denied",
        request_id = %request_id,
        role = %role,
        reason = %reason,
        "access denied"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// Log an unrecognised classifier label.
pub fn label_fallback(request_id: Uuid, raw_label: &str, fallback: &str) {
    tracing::warn!(
        event = "label_fallback",
        request_id = %request_id,
        raw_label = %raw_label,
        fallback = %fallback,
        "unrecognised classifier label"
    );
}

/// Log a generated query refused by the guard.
pub fn query_rejected(request_id: Uuid, violation: &str) {
    tracing::warn!(
        event = "query_rejected",
        request_id = %request_id,
        violation = %violation,
        "generated query rejected"
    );
}
