use serde::{Deserialize, Serialize};

use super::defaults;

/// Text-generation collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// OpenAI-compatible chat completions endpoint.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token. Never serialized back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds (doubles each retry).
    pub initial_backoff_ms: u64,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::DEFAULT_GENERATION_ENDPOINT.to_string(),
            model: defaults::DEFAULT_GENERATION_MODEL.to_string(),
            api_key: None,
            timeout_secs: defaults::DEFAULT_GENERATION_TIMEOUT_SECS,
            max_retries: defaults::DEFAULT_GENERATION_MAX_RETRIES,
            initial_backoff_ms: defaults::DEFAULT_GENERATION_INITIAL_BACKOFF_MS,
            temperature: defaults::DEFAULT_GENERATION_TEMPERATURE,
        }
    }
}
