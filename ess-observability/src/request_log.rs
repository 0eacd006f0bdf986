//! Request log: resolution path, outcome, latency, and error kind per request.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ess_core::models::ResolutionPath;
use ess_core::StageErrorKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a request ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A composed answer from at least one source.
    Answered,
    /// One of the fixed "nothing found" messages.
    NoData,
    /// The access evaluator refused the structured request.
    Denied,
    /// A recorded error turned the answer into an apology.
    Degraded,
}

impl RequestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::NoData => "no_data",
            Self::Denied => "denied",
            Self::Degraded => "degraded",
        }
    }
}

/// A single request log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub request_id: Uuid,
    pub session_id: String,
    pub path: Option<ResolutionPath>,
    pub outcome: RequestOutcome,
    pub error_kind: Option<StageErrorKind>,
    pub latency: Duration,
    pub timestamp_epoch_ms: i64,
}

impl RequestLogEntry {
    /// Create a new entry with the timestamp set to now.
    pub fn new(
        request_id: Uuid,
        session_id: impl Into<String>,
        path: Option<ResolutionPath>,
        outcome: RequestOutcome,
        error_kind: Option<StageErrorKind>,
        latency: Duration,
    ) -> Self {
        Self {
            request_id,
            session_id: session_id.into(),
            path,
            outcome,
            error_kind,
            latency,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Bounded, append-only request log. Oldest entries drop first.
///
/// The ring sits behind its own mutex, taken only to push or read entries;
/// callers share the log by reference.
#[derive(Debug)]
pub struct RequestLog {
    entries: Mutex<VecDeque<RequestLogEntry>>,
    max_entries: usize,
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::with_capacity(ess_core::config::defaults::DEFAULT_REQUEST_LOG_CAPACITY)
    }
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom capacity. A capacity of 0 retains nothing.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries,
        }
    }

    fn ring(&self) -> MutexGuard<'_, VecDeque<RequestLogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, entry: RequestLogEntry) {
        crate::tracing_setup::events::request_completed(
            entry.request_id,
            entry.path.map_or("none", |p| p.label()),
            entry.outcome.as_str(),
            entry.latency.as_millis() as u64,
        );
        if self.max_entries == 0 {
            return;
        }
        let mut ring = self.ring();
        if ring.len() == self.max_entries {
            ring.pop_front();
        }
        ring.push_back(entry);
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> Vec<RequestLogEntry> {
        self.ring().iter().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.ring().len()
    }

    pub fn count_outcome(&self, outcome: RequestOutcome) -> usize {
        self.ring().iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn count_path(&self, path: ResolutionPath) -> usize {
        self.ring().iter().filter(|e| e.path == Some(path)).count()
    }

    /// Average latency across retained entries.
    pub fn avg_latency(&self) -> Duration {
        let ring = self.ring();
        if ring.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = ring.iter().map(|e| e.latency).sum();
        total / ring.len() as u32
    }

    /// Latency at the given percentile (0.0 to 1.0).
    pub fn latency_percentile(&self, p: f64) -> Duration {
        let mut latencies: Vec<Duration> = self.ring().iter().map(|e| e.latency).collect();
        if latencies.is_empty() {
            return Duration::ZERO;
        }
        latencies.sort();
        let idx = ((p.clamp(0.0, 1.0) * (latencies.len() - 1) as f64).round() as usize)
            .min(latencies.len() - 1);
        latencies[idx]
    }
}
