//! Result of one task invocation.

use super::{Diagnostic, Severity};

/// What a task did to the file: optionally replace its content and emit any
/// number of diagnostics. The default value is "no change".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub replacement: Option<Vec<u8>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn none() -> Self {
        Self::default()
    }

    /// Replace the content and report it as a fix.
    pub fn fixed(content: Vec<u8>, message: impl Into<String>) -> Self {
        Self {
            replacement: Some(content),
            diagnostics: vec![Diagnostic::fix(message)],
        }
    }

    pub fn diagnostic(diagnostic: Diagnostic) -> Self {
        Self {
            replacement: None,
            diagnostics: vec![diagnostic],
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn is_none(&self) -> bool {
        self.replacement.is_none() && self.diagnostics.is_empty()
    }
}
