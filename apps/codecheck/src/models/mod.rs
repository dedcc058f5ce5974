//! Shared data models for the task pipeline and the printers.

pub mod context;
pub mod outcome;

pub use context::FileContext;
pub use outcome::Outcome;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// How a finding affects the run.
///
/// `Fix` marks an auto-correctable finding. It fails the run only in
/// read-only mode, where the correction is reported but not applied.
pub enum Severity {
    Fix,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single finding emitted by a task.
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn fix(message: impl Into<String>) -> Self {
        Self::new(Severity::Fix, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
        }
    }

    /// Attach a 1-based line number.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} on line {}", self.message, line),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Aggregated run summary used by printers and the exit code.
pub struct RunSummary {
    pub files: usize,
    pub written: usize,
    pub errors: usize,
    pub warnings: usize,
    pub fixes: usize,
    pub success: bool,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Count one diagnostic by severity.
    pub fn record(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Fix => self.fixes += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
    }
}
