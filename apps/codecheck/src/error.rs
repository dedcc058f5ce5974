//! Fatal startup errors.
//!
//! Anything in here aborts the run before the first file is scanned and maps
//! to exit code 2. Problems with individual files are diagnostics, not errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("folder not found: {path}: {source}")]
    RootNotFound { path: PathBuf, source: io::Error },
    #[error("not a folder: {0}")]
    RootNotDir(PathBuf),
    #[error("failed to read config {path}: {source}")]
    ReadConfig { path: PathBuf, source: io::Error },
    #[error("invalid config {path}: {message}")]
    ParseConfig { path: PathBuf, message: String },
    #[error("invalid output mode '{0}' (expected human or json)")]
    InvalidOutput(String),
    #[error("no syntax decoder for '{0}' (known: neon, json, yaml, yml, toml)")]
    UnknownSyntax(String),
    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("failed to scan {path}: {source}")]
    Walk { path: PathBuf, source: io::Error },
    #[error("invalid log filter: {0}")]
    LogFilter(String),
    #[error("failed to install logger: {0}")]
    Logger(String),
}
