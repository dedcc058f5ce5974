//! File discovery under the scan root.
//!
//! Accept patterns match file names. Ignore patterns match the names of both
//! directories and files; an ignored directory prunes its whole subtree. A
//! file named literally in the accept list (such as `.htaccess`) is exempt
//! from ignore patterns, so `.*` skips `.git` without hiding it. Entries are
//! visited in name order, which makes every run see files in the same order.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};

use crate::error::CheckerError;

#[derive(Debug, Clone)]
pub struct FileFilter {
    accept: Vec<Pattern>,
    ignore: Vec<Pattern>,
    /// Accept entries without wildcards.
    literal: Vec<String>,
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, CheckerError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| CheckerError::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

impl FileFilter {
    pub fn new(accept: &[String], ignore: &[String]) -> Result<Self, CheckerError> {
        Ok(Self {
            accept: compile(accept)?,
            ignore: compile(ignore)?,
            literal: accept
                .iter()
                .filter(|p| Pattern::escape(p) == **p)
                .cloned()
                .collect(),
        })
    }

    pub fn accepts_file(&self, name: &str) -> bool {
        self.accept.iter().any(|p| p.matches(name))
    }

    pub fn skips_dir(&self, name: &str) -> bool {
        self.ignore.iter().any(|p| p.matches(name))
    }

    pub fn skips_file(&self, name: &str) -> bool {
        self.skips_dir(name) && !self.literal.iter().any(|l| l == name)
    }
}

/// Collect accepted files below `root`.
///
/// Failing to list `root` itself is fatal; unreadable subdirectories are
/// logged and skipped. Symlinked directories are not followed.
pub fn find_files(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>, CheckerError> {
    let entries = read_sorted(root).map_err(|source| CheckerError::Walk {
        path: root.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    visit(entries, filter, &mut files);
    debug!(count = files.len(), root = %root.display(), "collected files");
    Ok(files)
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn visit(entries: Vec<fs::DirEntry>, filter: &FileFilter, files: &mut Vec<PathBuf>) {
    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let Ok(kind) = entry.file_type() else {
            warn!(path = %path.display(), "cannot stat entry");
            continue;
        };
        if kind.is_dir() {
            if filter.skips_dir(&name) {
                continue;
            }
            match read_sorted(&path) {
                Ok(children) => visit(children, filter, files),
                Err(e) => warn!(path = %path.display(), error = %e, "cannot read directory"),
            }
        } else if (kind.is_file() || (kind.is_symlink() && path.is_file()))
            && filter.accepts_file(&name)
            && !filter.skips_file(&name)
        {
            files.push(path);
        }
    }
}

/// Path of `path` relative to `root`, with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    rel.to_string_lossy().replace('\\', "/")
}
