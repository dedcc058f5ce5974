//! codecheck CLI binary entry point.
//! Resolves configuration, builds the task list and runs the check.

use clap::Parser;
use codecheck::check::{run_check, CheckOptions};
use codecheck::cli::Cli;
use codecheck::config::{self, OutputMode};
use codecheck::error::CheckerError;
use codecheck::logging;
use codecheck::output::{self, error_prefix, info_prefix};
use codecheck::tasks::{default_tasks, TaskOptions, NATIVE_EOL};
use codecheck::walker::{find_files, FileFilter};
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every file passed.
fn run(cli: Cli) -> Result<bool, CheckerError> {
    let eff = config::resolve_effective(
        cli.root.as_deref(),
        cli.fix.then_some(true),
        cli.eol.then_some(true),
        cli.output.as_deref(),
        cli.parallel.then_some(true),
        cli.log_level.as_deref(),
    )?;
    logging::init(&eff.log)?;
    debug!(config = ?eff.config_path, root = %eff.root.display(), "resolved configuration");

    let filter = FileFilter::new(&eff.accept, &eff.ignore)?;
    let tasks = default_tasks(&TaskOptions {
        eol: eff.eol,
        indentation: eff.indentation.clone(),
        config_syntax: eff.config_syntax.clone(),
        native_eol: NATIVE_EOL,
    })?;
    let files = find_files(&eff.root, &filter)?;

    if eff.output == OutputMode::Human {
        if eff.config_path.is_none() {
            eprintln!("{} No codecheck.toml found; using defaults.", info_prefix());
        }
        eprintln!(
            "{} Scanning {} ({} files, {})",
            info_prefix(),
            eff.root.display(),
            files.len(),
            if eff.mode.is_read_only() {
                "read-only"
            } else {
                "fixing"
            }
        );
    }

    let mut reporter = output::reporter(eff.output, eff.mode);
    let summary = run_check(
        &eff.root,
        &files,
        &tasks,
        CheckOptions {
            mode: eff.mode,
            parallel: eff.parallel,
        },
        reporter.as_mut(),
    );
    Ok(summary.success)
}
