//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout only ever carries diagnostics.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

use crate::error::CheckerError;

/// Environment variable that overrides every other log filter source.
pub const LOG_ENV: &str = "CODECHECK_LOG";

/// Install the global subscriber with `CODECHECK_LOG` or, when unset, `level`.
pub fn init(level: &str) -> Result<(), CheckerError> {
    let directive = std::env::var(LOG_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    let filter =
        EnvFilter::try_new(&directive).map_err(|e| CheckerError::LogFilter(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init()
        .map_err(|e| CheckerError::Logger(e.to_string()))
}
