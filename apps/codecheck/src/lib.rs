//! codecheck core library.
//!
//! This crate exposes programmatic APIs for checking and fixing a PHP
//! project's source tree: every accepted file runs through an ordered list of
//! tasks, and fixes are written back only when asked to.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `walker`: File discovery with accept/ignore patterns.
//! - `pipeline`: The `Task` trait and per-file pipeline.
//! - `tasks`: Built-in tasks and their default order.
//! - `lexer`: Minimal PHP tokenizer used by PHP-aware tasks.
//! - `syntax`: Latte, NEON and serde-backed syntax validators.
//! - `check`: Runner gluing walker, pipeline, write-back and output.
//! - `models`: Diagnostics, file context, task outcomes and summaries.
//! - `output`: Human/JSON reporters.
//! - `logging`: Tracing subscriber setup.
//! - `error`: Fatal startup errors.
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod syntax;
pub mod tasks;
pub mod walker;
