//! Ordered task pipeline for a single file.
//!
//! Content flows through the tasks in registration order, each task seeing
//! the output of the previous one. The first task that reports an error
//! abandons the file: its replacement is dropped and no later task runs.
//! Diagnostics are handed to the caller's sink as soon as a task returns.

use crate::models::{Diagnostic, FileContext, Outcome, Severity};
use tracing::trace;

/// A named check-and-fix pass over a whole file.
///
/// Tasks are pure: the same context and content always produce the same
/// outcome. A task that does not apply to the file's type returns
/// [`Outcome::none`].
pub trait Task: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether fixes are applied to disk or only reported.
pub enum Mode {
    ReadOnly,
    Fix,
}

impl Mode {
    pub fn is_read_only(self) -> bool {
        self == Mode::ReadOnly
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Terminal and intermediate states of a file's run.
pub enum FileState {
    /// Abandoned by the named task.
    Failed { task: &'static str },
    /// Every task ran; the content may or may not differ.
    Completed,
    Written,
    Unchanged,
}

#[derive(Debug, Clone)]
/// Result of running the pipeline over one file.
pub struct FileReport {
    pub state: FileState,
    /// Content after the last successful task.
    pub content: Vec<u8>,
    /// False when the file raised an error, or a fix in read-only mode.
    pub passed: bool,
}

/// Run `tasks` over `original`, forwarding each diagnostic to `emit`.
pub fn check_file(
    file: &FileContext,
    original: &[u8],
    tasks: &[Box<dyn Task>],
    mode: Mode,
    emit: &mut dyn FnMut(&Diagnostic),
) -> FileReport {
    let mut content = original.to_vec();
    let mut passed = true;
    for task in tasks {
        trace!(task = task.name(), file = file.path(), "running task");
        let outcome = task.run(file, &content);
        for d in &outcome.diagnostics {
            emit(d);
            if d.severity == Severity::Fix && mode.is_read_only() {
                passed = false;
            }
        }
        if outcome.has_error() {
            return FileReport {
                state: FileState::Failed { task: task.name() },
                content,
                passed: false,
            };
        }
        if let Some(next) = outcome.replacement {
            content = next;
        }
    }
    FileReport {
        state: FileState::Completed,
        content,
        passed,
    }
}
