//! Health reporting over the three collaborators.

use ess_core::config::defaults::RECENT_FAILURE_WINDOW_SECS;
use serde::{Deserialize, Serialize};

use crate::components;
use crate::degradation::DegradationTracker;
use crate::request_log::RequestLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// What the pipeline knows about one collaborator at report time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorStatus {
    /// Component name (see [`components`]).
    pub component: &'static str,
    /// Provider name reported by the collaborator.
    pub provider: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorHealth {
    pub component: String,
    pub provider: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    /// Degradation events within the recent-failure window.
    pub recent_failures: usize,
    /// Seconds since the oldest unrecovered degradation.
    pub degraded_for_secs: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub collaborators: Vec<CollaboratorHealth>,
    pub active_degradations: usize,
    pub requests_logged: usize,
    pub avg_latency_ms: u64,
    pub p95_latency_ms: u64,
}

/// Inputs for a health report.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub collaborators: Vec<CollaboratorStatus>,
}

/// Builds a [`HealthReport`] from a snapshot, the degradation tracker, and
/// the request log.
pub struct HealthReporter;

impl HealthReporter {
    pub fn build(
        snapshot: &HealthSnapshot,
        tracker: &DegradationTracker,
        log: &RequestLog,
    ) -> HealthReport {
        let collaborators: Vec<CollaboratorHealth> = snapshot
            .collaborators
            .iter()
            .map(|c| Self::check(c, tracker))
            .collect();
        let overall_status = collaborators
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        HealthReport {
            overall_status,
            collaborators,
            active_degradations: tracker.active_count(),
            requests_logged: log.count(),
            avg_latency_ms: log.avg_latency().as_millis() as u64,
            p95_latency_ms: log.latency_percentile(0.95).as_millis() as u64,
        }
    }

    /// Without generation every answer is an apology, so an unavailable
    /// generator is unhealthy. The other collaborators only degrade answers.
    fn check(status: &CollaboratorStatus, tracker: &DegradationTracker) -> CollaboratorHealth {
        let (health, message) = if !status.available {
            let health = if status.component == components::GENERATION {
                HealthStatus::Unhealthy
            } else {
                HealthStatus::Degraded
            };
            (health, Some("collaborator reports unavailable".to_string()))
        } else if tracker.is_degraded(status.component) {
            (
                HealthStatus::Degraded,
                Some("failing without recovery".to_string()),
            )
        } else {
            (HealthStatus::Healthy, None)
        };
        CollaboratorHealth {
            component: status.component.to_string(),
            provider: status.provider.clone(),
            status: health,
            message,
            recent_failures: tracker.count_recent(status.component, RECENT_FAILURE_WINDOW_SECS),
            degraded_for_secs: tracker
                .degraded_duration(status.component)
                .map(|d| d.num_seconds()),
        }
    }
}
