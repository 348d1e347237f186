//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

use crate::config::LoggingConfig;

/// Initialize the logging system
///
/// Uses the configured filter as the default; `RUST_LOG` still takes
/// precedence when set. Calling this more than once is harmless, later
/// calls are ignored.
pub fn init(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.filter.as_str());
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp_millis();
    if !config.timestamps {
        builder.format_timestamp(None);
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
