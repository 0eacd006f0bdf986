//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use ess_core::config::defaults::LOG_FILTER_ENV_VAR;
use ess_core::config::ObservabilityConfig;
use ess_core::errors::{EssError, EssResult};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects the `ESS_LOG` environment variable for filtering, falling back to
/// the configured level. Fails if a global subscriber is already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> EssResult<()> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    install(filter, config.json)
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str, json: bool) -> EssResult<()> {
    install(EnvFilter::new(filter), json)
}

fn install(filter: EnvFilter, json: bool) -> EssResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = if json {
        builder
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| EssError::Config {
        reason: format!("tracing already initialized: {e}"),
    })
}
