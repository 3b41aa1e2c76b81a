//! Tracing subscriber setup

use crate::config::LoggingConfig;
use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Filter directive for the configured level; `verbose` forces debug output
#[must_use]
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("weathersite={level},warn")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over configuration.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(config, verbose)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
