//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use warden_core::config::LoggingConfig;
use warden_core::{AppError, AppResult};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        "pretty" => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown log format: '{other}'. Supported: json, pretty"
            )));
        }
    };

    installed.map_err(|e| AppError::internal(format!("Failed to install subscriber: {e}")))
}
