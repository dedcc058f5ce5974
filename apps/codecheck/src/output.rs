//! Output rendering for check runs.
//!
//! Supports `human` (default) and `json` outputs. Human output prints one
//! line per diagnostic as it happens plus a summary; the JSON form is a
//! single document with every diagnostic and the summary, printed at the end.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

use crate::config::OutputMode;
use crate::models::{Diagnostic, FileContext, RunSummary, Severity};
use crate::pipeline::Mode;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

fn use_colors(output: OutputMode) -> bool {
    output != OutputMode::Json && std::env::var_os("NO_COLOR").is_none()
}

/// Sink for everything a run reports.
pub trait Reporter {
    /// Called before each file is checked.
    fn progress(&mut self, _file: &FileContext) {}
    fn diagnostic(&mut self, file: &FileContext, diagnostic: &Diagnostic);
    fn finish(&mut self, summary: &RunSummary);
}

/// Build the reporter for `output`.
pub fn reporter(output: OutputMode, mode: Mode) -> Box<dyn Reporter> {
    match output {
        OutputMode::Json => Box::new(JsonReporter::new(mode)),
        OutputMode::Human => Box::new(HumanReporter::new(mode)),
    }
}

/// Label of a severity; fixes that are only reported read as `FOUND`.
pub fn severity_label(severity: Severity, mode: Mode) -> &'static str {
    match severity {
        Severity::Fix if mode.is_read_only() => "FOUND",
        Severity::Fix => "FIX",
        Severity::Warning => "WARNING",
        Severity::Error => "ERROR",
    }
}

/// One human-readable diagnostic line (pure).
pub fn format_line(label: &str, path: &str, diagnostic: &Diagnostic) -> String {
    format!("[{}] {}   {}", label, path, diagnostic)
}

pub struct HumanReporter {
    mode: Mode,
    color: bool,
    spinner: Option<usize>,
}

impl HumanReporter {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            color: use_colors(OutputMode::Human),
            spinner: io::stderr().is_terminal().then_some(0),
        }
    }

    fn clear_spinner(&self) {
        if self.spinner.is_some() {
            eprint!("\r \r");
        }
    }

    fn paint(&self, severity: Severity, label: &str) -> String {
        if !self.color {
            return label.to_string();
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Fix if self.mode.is_read_only() => label.magenta().bold().to_string(),
            Severity::Fix => label.green().bold().to_string(),
        }
    }
}

impl Reporter for HumanReporter {
    fn progress(&mut self, _file: &FileContext) {
        if let Some(n) = self.spinner.as_mut() {
            eprint!("{}\r", SPINNER[*n % SPINNER.len()]);
            let _ = io::stderr().flush();
            *n += 1;
        }
    }

    fn diagnostic(&mut self, file: &FileContext, diagnostic: &Diagnostic) {
        self.clear_spinner();
        let label = self.paint(
            diagnostic.severity,
            severity_label(diagnostic.severity, self.mode),
        );
        println!("{}", format_line(&label, file.path(), diagnostic));
    }

    fn finish(&mut self, summary: &RunSummary) {
        self.clear_spinner();
        let line = format!(
            "Done. files={} written={} errors={} warnings={} fixes={}",
            summary.files, summary.written, summary.errors, summary.warnings, summary.fixes
        );
        if self.color {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

/// Collects diagnostics and prints one JSON document on finish.
pub struct JsonReporter {
    mode: Mode,
    items: Vec<JsonVal>,
}

impl JsonReporter {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            items: Vec::new(),
        }
    }
}

impl Reporter for JsonReporter {
    fn diagnostic(&mut self, file: &FileContext, diagnostic: &Diagnostic) {
        self.items.push(compose_item(file, diagnostic, self.mode));
    }

    fn finish(&mut self, summary: &RunSummary) {
        let out = compose_json(std::mem::take(&mut self.items), summary);
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    }
}

/// JSON object for one diagnostic (pure).
pub fn compose_item(file: &FileContext, diagnostic: &Diagnostic, mode: Mode) -> JsonVal {
    let severity = severity_label(diagnostic.severity, mode).to_ascii_lowercase();
    json!({
        "file": file.path(),
        "severity": severity,
        "message": diagnostic.message,
        "line": diagnostic.line,
    })
}

/// Compose the run JSON document (pure) for testing/snapshot purposes.
pub fn compose_json(items: Vec<JsonVal>, summary: &RunSummary) -> JsonVal {
    json!({
        "diagnostics": items,
        "summary": summary,
    })
}

/// Prefix for fatal error lines on stderr.
pub fn error_prefix() -> String {
    if use_colors(OutputMode::Human) {
        "Error:".red().bold().to_string()
    } else {
        "Error:".to_string()
    }
}

/// Prefix for informational notes on stderr.
pub fn info_prefix() -> String {
    if use_colors(OutputMode::Human) {
        "Note:".blue().bold().to_string()
    } else {
        "Note:".to_string()
    }
}
