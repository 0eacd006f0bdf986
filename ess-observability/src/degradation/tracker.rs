//! Record every collaborator failure: component, failure, fallback used,
//! timestamp, recovery status.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// One collaborator failure the pipeline degraded around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}

impl DegradationEvent {
    pub fn new(
        component: impl Into<String>,
        failure: impl Into<String>,
        fallback_used: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            failure: failure.into(),
            fallback_used: fallback_used.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Recovery status of a degradation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still in degraded mode.
    Active,
    /// A later call to the component succeeded.
    Recovered,
}

/// A tracked degradation event with recovery status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    /// Order of recording across all components.
    pub sequence: u64,
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Tracks degradation events for health reporting.
///
/// Events are sharded by component, and each component keeps at most
/// `per_component` events. Every method takes `&self`; concurrent requests
/// only contend when they touch the same component.
#[derive(Debug)]
pub struct DegradationTracker {
    components: DashMap<String, VecDeque<TrackedDegradation>>,
    per_component: usize,
    sequence: AtomicU64,
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::with_capacity(ess_core::config::defaults::DEFAULT_DEGRADATION_CAPACITY)
    }
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `per_component` events per component (minimum 1).
    pub fn with_capacity(per_component: usize) -> Self {
        Self {
            components: DashMap::new(),
            per_component: per_component.max(1),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn record(&self, event: DegradationEvent) {
        crate::tracing_setup::events::degradation_triggered(
            &event.component,
            &event.failure,
            &event.fallback_used,
        );
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut events = self.components.entry(event.component.clone()).or_default();
        if events.len() == self.per_component {
            events.pop_front();
        }
        events.push_back(TrackedDegradation {
            sequence,
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
    }

    /// Mark every active degradation of `component` as recovered.
    pub fn mark_recovered(&self, component: &str) {
        let Some(mut events) = self.components.get_mut(component) else {
            return;
        };
        let now = Utc::now();
        for tracked in events
            .iter_mut()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
        {
            tracked.recovery_status = RecoveryStatus::Recovered;
            tracked.recovered_at = Some(now);
        }
    }

    /// Every retained event, oldest first.
    pub fn events(&self) -> Vec<TrackedDegradation> {
        let mut all: Vec<TrackedDegradation> = self
            .components
            .iter()
            .flat_map(|entry| entry.value().iter().cloned().collect::<Vec<_>>())
            .collect();
        all.sort_by_key(|t| t.sequence);
        all
    }

    /// Retained events for one component, oldest first.
    pub fn events_for(&self, component: &str) -> Vec<TrackedDegradation> {
        self.components
            .get(component)
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn active_count(&self) -> usize {
        self.components
            .iter()
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|t| t.recovery_status == RecoveryStatus::Active)
                    .count()
            })
            .sum()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.components.get(component).is_some_and(|events| {
            events
                .iter()
                .any(|t| t.recovery_status == RecoveryStatus::Active)
        })
    }

    /// Count events in the last N seconds for a given component.
    pub fn count_recent(&self, component: &str, window_secs: i64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::seconds(window_secs);
        self.components.get(component).map_or(0, |events| {
            events.iter().filter(|t| t.event.timestamp > cutoff).count()
        })
    }

    /// Duration a component has been continuously degraded, or None if not degraded.
    pub fn degraded_duration(&self, component: &str) -> Option<chrono::Duration> {
        let earliest = self
            .components
            .get(component)?
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .map(|t| t.event.timestamp)
            .min()?;
        Some(Utc::now() - earliest)
    }
}
