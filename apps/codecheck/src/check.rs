//! Check runner: reads each file, runs the task pipeline, writes fixes back
//! and forwards diagnostics to the reporter.
//!
//! In parallel mode each file's diagnostics are buffered and replayed in
//! walker order, so output does not depend on scheduling.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::models::{Diagnostic, FileContext, RunSummary};
use crate::output::Reporter;
use crate::pipeline::{check_file, FileState, Mode, Task};
use crate::walker::relative_path;

#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    pub mode: Mode,
    pub parallel: bool,
}

/// What happened to one file, with the diagnostics it produced.
struct Processed {
    file: FileContext,
    state: FileState,
    passed: bool,
    diagnostics: Vec<Diagnostic>,
}

fn account(p: &Processed, summary: &mut RunSummary) {
    summary.files += 1;
    if p.state == FileState::Written {
        summary.written += 1;
    }
    if !p.passed {
        summary.success = false;
    }
}

/// Run `tasks` over `files` and report through `reporter`.
pub fn run_check(
    root: &Path,
    files: &[PathBuf],
    tasks: &[Box<dyn Task>],
    options: CheckOptions,
    reporter: &mut dyn Reporter,
) -> RunSummary {
    info!(files = files.len(), mode = ?options.mode, parallel = options.parallel, "starting check");
    let mut summary = RunSummary::new();

    if options.parallel {
        let processed: Vec<Processed> = files
            .par_iter()
            .map(|path| {
                let file = FileContext::new(relative_path(root, path));
                let mut diagnostics = Vec::new();
                let (state, passed) =
                    process_file(path, &file, tasks, options.mode, &mut |d| {
                        diagnostics.push(d.clone())
                    });
                Processed {
                    file,
                    state,
                    passed,
                    diagnostics,
                }
            })
            .collect();
        for p in &processed {
            reporter.progress(&p.file);
            for d in &p.diagnostics {
                summary.record(d);
                reporter.diagnostic(&p.file, d);
            }
            account(p, &mut summary);
        }
    } else {
        for path in files {
            let file = FileContext::new(relative_path(root, path));
            reporter.progress(&file);
            let (state, passed) = process_file(path, &file, tasks, options.mode, &mut |d| {
                summary.record(d);
                reporter.diagnostic(&file, d);
            });
            let p = Processed {
                file,
                state,
                passed,
                diagnostics: Vec::new(),
            };
            account(&p, &mut summary);
        }
    }

    info!(
        files = summary.files,
        written = summary.written,
        errors = summary.errors,
        success = summary.success,
        "check finished"
    );
    reporter.finish(&summary);
    summary
}

/// Read, check and (in fix mode) rewrite a single file.
fn process_file(
    path: &Path,
    file: &FileContext,
    tasks: &[Box<dyn Task>],
    mode: Mode,
    emit: &mut dyn FnMut(&Diagnostic),
) -> (FileState, bool) {
    let original = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(file = file.path(), error = %e, "cannot read file");
            emit(&Diagnostic::error(format!("cannot read file: {}", e)));
            return (FileState::Failed { task: "read" }, false);
        }
    };
    debug!(file = file.path(), bytes = original.len(), "checking");

    let report = check_file(file, &original, tasks, mode, emit);
    if report.state != FileState::Completed {
        return (report.state, report.passed);
    }
    if mode.is_read_only() || report.content == original {
        return (FileState::Unchanged, report.passed);
    }
    match fs::write(path, &report.content) {
        Ok(()) => {
            debug!(file = file.path(), bytes = report.content.len(), "written");
            (FileState::Written, report.passed)
        }
        Err(e) => {
            emit(&Diagnostic::error(format!("cannot write file: {}", e)));
            (FileState::Failed { task: "write" }, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::tasks::{default_tasks, TaskOptions};
    use crate::walker::{find_files, FileFilter};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Collect {
        lines: Vec<String>,
        finished: Option<RunSummary>,
    }

    impl Reporter for Collect {
        fn diagnostic(&mut self, file: &FileContext, d: &Diagnostic) {
            self.lines.push(format!("{:?} {} {}", d.severity, file.path(), d));
        }
        fn finish(&mut self, summary: &RunSummary) {
            self.finished = Some(summary.clone());
        }
    }

    fn tasks() -> Vec<Box<dyn Task>> {
        let options = TaskOptions {
            native_eol: "\n",
            ..TaskOptions::default()
        };
        default_tasks(&options).unwrap()
    }

    fn run(root: &Path, mode: Mode, parallel: bool) -> (RunSummary, Collect) {
        let accept: Vec<String> = ["*.php", "*.txt", "*.neon", "*.latte"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let filter = FileFilter::new(&accept, &[".*".to_string()]).unwrap();
        let files = find_files(root, &filter).unwrap();
        let mut reporter = Collect::default();
        let summary = run_check(
            root,
            &files,
            &tasks(),
            CheckOptions { mode, parallel },
            &mut reporter,
        );
        (summary, reporter)
    }

    #[test]
    fn test_bom_and_whitespace_fixed_in_order() {
        let td = tempdir().unwrap();
        let path = td.path().join("a.txt");
        fs::write(&path, b"\xEF\xBB\xBFhello  \n\n\n").unwrap();

        let (summary, rep) = run(td.path(), Mode::Fix, false);
        assert_eq!(
            rep.lines,
            vec![
                "Fix a.txt contains BOM",
                "Fix a.txt 4 bytes of whitespaces",
            ]
        );
        assert_eq!(fs::read(&path).unwrap(), b"hello\n");
        assert!(summary.success);
        assert_eq!((summary.files, summary.written, summary.fixes), (1, 1, 2));
        assert_eq!(rep.finished, Some(summary));

        // second run is clean
        let (summary, rep) = run(td.path(), Mode::Fix, false);
        assert!(rep.lines.is_empty());
        assert_eq!(summary.written, 0);
    }

    #[test]
    fn test_read_only_never_writes() {
        let td = tempdir().unwrap();
        let path = td.path().join("a.php");
        let original = b"<?php\necho 1;   \n?>\n".to_vec();
        fs::write(&path, &original).unwrap();

        let (summary, rep) = run(td.path(), Mode::ReadOnly, false);
        assert_eq!(fs::read(&path).unwrap(), original);
        assert!(!summary.success);
        assert_eq!(summary.written, 0);
        assert_eq!(rep.lines.len(), 2);
        assert!(rep.lines[0].contains("contains closing PHP tag ?>"));
    }

    #[test]
    fn test_error_fails_run_but_other_files_continue() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("a.neon"), "a: 1\na: 2\n").unwrap();
        fs::write(td.path().join("b.txt"), "ok  \n").unwrap();

        let (summary, rep) = run(td.path(), Mode::Fix, false);
        assert!(!summary.success);
        assert_eq!(summary.errors, 1);
        assert_eq!(
            rep.lines,
            vec![
                "Error a.neon Duplicated key 'a' on line 2",
                "Fix b.txt 2 bytes of whitespaces",
            ]
        );
        assert_eq!(fs::read(td.path().join("b.txt")).unwrap(), b"ok\n");
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("a.php"), "<?php\necho \"\\q\";\n").unwrap();
        let (summary, rep) = run(td.path(), Mode::ReadOnly, false);
        assert!(summary.success);
        assert_eq!(summary.warnings, 1);
        assert!(rep.lines[0].starts_with(&format!("{:?}", Severity::Warning)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let td = tempdir().unwrap();
        for i in 0..20 {
            let body = match i % 4 {
                0 => "<?php\n/* @var x */\n$a = \"\\q\";\n".to_string(),
                1 => format!("line {}   \n\n", i),
                2 => "x: [1\n".to_string(),
                _ => "{if 1}\n".to_string(),
            };
            let ext = ["php", "txt", "neon", "latte"][i % 4];
            fs::write(td.path().join(format!("f{:02}.{}", i, ext)), body).unwrap();
        }
        let (seq, seq_rep) = run(td.path(), Mode::ReadOnly, false);
        let (par, par_rep) = run(td.path(), Mode::ReadOnly, true);
        assert_eq!(seq, par);
        assert_eq!(seq_rep.lines, par_rep.lines);
        assert_eq!(seq.files, 20);
    }
}
