use serde::{Deserialize, Serialize};

use super::defaults;

/// Session memory and request lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Most recent turns rendered into prompts. 0 renders the whole transcript.
    pub history_window: usize,
    /// Default request deadline in seconds. 0 disables the deadline.
    pub request_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_window: defaults::DEFAULT_HISTORY_WINDOW,
            request_timeout_secs: defaults::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
