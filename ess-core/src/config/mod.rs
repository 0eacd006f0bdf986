pub mod access_config;
pub mod defaults;
pub mod document_config;
pub mod generation_config;
pub mod observability_config;
pub mod session_config;
pub mod structured_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use access_config::AccessConfig;
pub use document_config::DocumentConfig;
pub use generation_config::GenerationConfig;
pub use observability_config::ObservabilityConfig;
pub use session_config::SessionConfig;
pub use structured_config::StructuredConfig;

use crate::errors::{EssError, EssResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EssConfig {
    pub generation: GenerationConfig,
    pub structured: StructuredConfig,
    pub documents: DocumentConfig,
    pub access: AccessConfig,
    pub session: SessionConfig,
    pub observability: ObservabilityConfig,
}

impl EssConfig {
    /// Parse from a TOML string. Missing sections and fields take defaults.
    pub fn from_toml(input: &str) -> EssResult<Self> {
        toml::from_str(input).map_err(|e| EssError::Config {
            reason: e.to_string(),
        })
    }

    /// Load from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> EssResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| EssError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        let mut config = Self::from_toml(&raw)?;
        config.apply_env();
        Ok(config)
    }

    /// Fill the generation API key from the environment when the file left it unset.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Environment lookup is injected so overrides are testable.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.generation.api_key.is_some() {
            return;
        }
        self.generation.api_key = defaults::API_KEY_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty());
    }
}
