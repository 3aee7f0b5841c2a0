//! Tracing subscriber initialisation.

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::logging::LoggingConfig;
use crate::error::AppError;
use crate::result::AppResult;

/// Environment variable consulted by the plugin when it installs its own
/// subscriber inside a host process.
pub const PLUGIN_LOG_ENV: &str = "CALCULATOR_LOG";

/// Installs the global tracing subscriber described by `config`.
///
/// `RUST_LOG` overrides the configured level. Fails if a global subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    installed.map_err(|e| AppError::internal(format!("Failed to install subscriber: {e}")))
}

/// Installs a compact subscriber filtered by `env_var`, falling back to
/// `default_level`.
///
/// Returns `false` when the process already has a global subscriber, which
/// is the normal case when the host set up logging before loading us.
pub fn try_init_from_env(env_var: &str, default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_env(env_var).unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .compact()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
