use serde::{Deserialize, Serialize};

use super::defaults;

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Entries retained by the in-process request log.
    pub request_log_capacity: usize,
    /// Degradation events retained per component. Oldest drop first.
    pub degradation_capacity: usize,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json: defaults::DEFAULT_JSON_LOGS,
            request_log_capacity: defaults::DEFAULT_REQUEST_LOG_CAPACITY,
            degradation_capacity: defaults::DEFAULT_DEGRADATION_CAPACITY,
        }
    }
}
