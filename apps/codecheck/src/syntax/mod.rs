//! Syntax collaborators used by the validation tasks.
//!
//! The template and config validators only need a yes/no answer plus a
//! message, so each collaborator is a trait returning `Result<(), _>`.
//!
//! - `latte`: Latte template tag checker.
//! - `neon`: NEON structure decoder.
//! - `structured`: JSON/YAML/TOML decoders backed by serde.

pub mod latte;
pub mod neon;
pub mod structured;

use thiserror::Error;

/// Compiles a template and reports the first problem found.
pub trait TemplateCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<(), TemplateError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A tag or attribute the compiler does not know. Expected when a
    /// template is checked outside its project, where extensions are missing.
    #[error("{0}")]
    UnknownConstruct(String),
    #[error("{message}")]
    Syntax { message: String, line: Option<usize> },
}

/// Decodes a structured config document.
pub trait ConfigDecoder: Send + Sync {
    fn decode(&self, source: &str) -> Result<(), DecodeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
    pub line: Option<usize>,
}

impl DecodeError {
    pub fn new(message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Look up the decoder registered under a syntax name.
pub fn decoder_for(name: &str) -> Option<Box<dyn ConfigDecoder>> {
    match name {
        "neon" => Some(Box::new(neon::Neon)),
        "json" => Some(Box::new(structured::Json)),
        "yaml" | "yml" => Some(Box::new(structured::Yaml)),
        "toml" => Some(Box::new(structured::Toml)),
        _ => None,
    }
}

/// 1-based line of byte offset `pos`.
pub(crate) fn line_at(source: &str, pos: usize) -> usize {
    source.as_bytes()[..pos.min(source.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}
