//! Configuration discovery and effective settings resolution.
//!
//! codecheck reads `codecheck.toml|yaml|yml` from the scan root or the
//! closest ancestor (stopping at a directory that holds `.git`) and merges it
//! with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `fix`, `eol`, `parallel`: false
//! - `output`: `human`
//! - `log`: `warn`
//! - `accept` / `ignore`: [`DEFAULT_ACCEPT`] / [`DEFAULT_IGNORE`]
//! - `indentation`: [`DEFAULT_INDENTATION`]
//! - `config_syntax`: [`DEFAULT_CONFIG_SYNTAX`]
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CheckerError;
use crate::pipeline::Mode;

pub const CONFIG_FILES: [&str; 3] = ["codecheck.toml", "codecheck.yaml", "codecheck.yml"];

pub const DEFAULT_ACCEPT: &[&str] = &[
    "*.php",
    "*.phpt",
    "*.inc",
    "*.txt",
    "*.texy",
    "*.md",
    "*.css",
    "*.less",
    "*.js",
    "*.json",
    "*.latte",
    "*.htm",
    "*.html",
    "*.phtml",
    "*.xml",
    "*.ini",
    "*.neon",
    "*.sh",
    "*.bat",
    "*.sql",
    ".htaccess",
    ".gitignore",
];

pub const DEFAULT_IGNORE: &[&str] = &[".*", "*.tmp", "tmp", "temp", "log", "vendor"];

pub const DEFAULT_INDENTATION: &[&str] = &["php", "phpt", "css", "less", "js", "json", "neon"];

pub const DEFAULT_CONFIG_SYNTAX: &[&str] = &["neon"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `codecheck.toml|yaml`.
pub struct CheckerConfig {
    pub fix: Option<bool>,
    pub eol: Option<bool>,
    pub output: Option<String>,
    pub parallel: Option<bool>,
    pub log: Option<String>,
    /// Replaces the default accepted file-name patterns.
    pub accept: Option<Vec<String>>,
    /// Replaces the default ignored directory and file name patterns.
    pub ignore: Option<Vec<String>>,
    pub indentation: Option<Vec<String>>,
    pub config_syntax: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl FromStr for OutputMode {
    type Err = CheckerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(OutputMode::Human),
            "json" => Ok(OutputMode::Json),
            other => Err(CheckerError::InvalidOutput(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the run after applying precedence.
pub struct Effective {
    /// Canonical scan root.
    pub root: PathBuf,
    /// Config file that was applied, if any.
    pub config_path: Option<PathBuf>,
    pub mode: Mode,
    pub eol: bool,
    pub output: OutputMode,
    pub parallel: bool,
    pub log: String,
    pub accept: Vec<String>,
    pub ignore: Vec<String>,
    pub indentation: Vec<String>,
    pub config_syntax: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Walk upward from `start` to find a config file.
///
/// Stops after checking a directory that contains `.git`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut cur = start;
    loop {
        for name in CONFIG_FILES {
            let candidate = cur.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if cur.join(".git").exists() {
            return None;
        }
        cur = cur.parent()?;
    }
}

/// Load `CheckerConfig` from a TOML or YAML file, chosen by extension.
pub fn load_config(path: &Path) -> Result<CheckerConfig, CheckerError> {
    let s = fs::read_to_string(path).map_err(|source| CheckerError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&s).map_err(|e| e.to_string()),
        _ => toml::from_str(&s).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| CheckerError::ParseConfig {
        path: path.to_path_buf(),
        message: message.trim_end().to_string(),
    })
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// Flags that were not given on the command line are passed as `None`.
pub fn resolve_effective(
    cli_root: Option<&str>,
    cli_fix: Option<bool>,
    cli_eol: Option<bool>,
    cli_output: Option<&str>,
    cli_parallel: Option<bool>,
    cli_log: Option<&str>,
) -> Result<Effective, CheckerError> {
    let start = PathBuf::from(cli_root.unwrap_or("."));
    let root = start
        .canonicalize()
        .map_err(|source| CheckerError::RootNotFound {
            path: start.clone(),
            source,
        })?;
    if !root.is_dir() {
        return Err(CheckerError::RootNotDir(start));
    }

    let config_path = find_config(&root);
    let cfg = match config_path.as_deref() {
        Some(p) => load_config(p)?,
        None => CheckerConfig::default(),
    };

    let fix = cli_fix.or(cfg.fix).unwrap_or(false);
    let output = match cli_output.map(str::to_string).or(cfg.output) {
        Some(s) => s.parse()?,
        None => OutputMode::Human,
    };

    Ok(Effective {
        root,
        config_path,
        mode: if fix { Mode::Fix } else { Mode::ReadOnly },
        eol: cli_eol.or(cfg.eol).unwrap_or(false),
        output,
        parallel: cli_parallel.or(cfg.parallel).unwrap_or(false),
        log: cli_log
            .map(str::to_string)
            .or(cfg.log)
            .unwrap_or_else(|| "warn".to_string()),
        accept: cfg.accept.unwrap_or_else(|| owned(DEFAULT_ACCEPT)),
        ignore: cfg.ignore.unwrap_or_else(|| owned(DEFAULT_IGNORE)),
        indentation: cfg
            .indentation
            .unwrap_or_else(|| owned(DEFAULT_INDENTATION)),
        config_syntax: cfg
            .config_syntax
            .unwrap_or_else(|| owned(DEFAULT_CONFIG_SYNTAX)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn resolve(root: &Path) -> Effective {
        resolve_effective(root.to_str(), None, None, None, None, None).unwrap()
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve(dir.path());
        assert!(eff.config_path.is_none());
        assert_eq!(eff.mode, Mode::ReadOnly);
        assert_eq!(eff.output, OutputMode::Human);
        assert_eq!(eff.log, "warn");
        assert!(!eff.eol && !eff.parallel);
        assert_eq!(eff.accept.len(), DEFAULT_ACCEPT.len());
        assert_eq!(eff.config_syntax, vec!["neon"]);
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("codecheck.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
fix = true
output = "json"
parallel = true
ignore = ["vendor"]
config_syntax = ["neon", "json"]
    "#
        )
        .unwrap();

        // Resolve using explicit root to avoid global CWD races
        let eff = resolve(root);
        assert_eq!(eff.mode, Mode::Fix);
        assert_eq!(eff.output, OutputMode::Json);
        assert!(eff.parallel);
        assert_eq!(eff.ignore, vec!["vendor"]);
        assert_eq!(eff.config_syntax, vec!["neon", "json"]);
    }

    #[test]
    fn test_load_yaml_from_ancestor() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("codecheck.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
eol: true
log: debug
indentation:
  - php
  - js
            "#
        )
        .unwrap();
        let sub = root.join("app");
        fs::create_dir(&sub).unwrap();

        let eff = resolve(&sub);
        assert!(eff.eol);
        assert_eq!(eff.log, "debug");
        assert_eq!(eff.indentation, vec!["php", "js"]);
        assert!(eff.root.ends_with("app"));
    }

    #[test]
    fn test_search_stops_at_git_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("codecheck.toml"), "fix = true\n").unwrap();
        let repo = dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        assert!(find_config(&repo).is_none());
        assert_eq!(resolve(&repo).mode, Mode::ReadOnly);
    }

    #[test]
    fn test_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("codecheck.toml"),
            "fix = false\noutput = \"json\"\nlog = \"info\"\n",
        )
        .unwrap();
        let eff = resolve_effective(
            root.to_str(),
            Some(true),
            None,
            Some("human"),
            None,
            Some("trace"),
        )
        .unwrap();
        assert_eq!(eff.mode, Mode::Fix);
        assert_eq!(eff.output, OutputMode::Human);
        assert_eq!(eff.log, "trace");
    }

    #[test]
    fn test_fatal_config_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("codecheck.toml"), "fix = [").unwrap();
        let err = resolve_effective(root.to_str(), None, None, None, None, None).unwrap_err();
        assert!(matches!(err, CheckerError::ParseConfig { .. }));

        fs::write(root.join("codecheck.toml"), "output = \"xml\"\n").unwrap();
        let err = resolve_effective(root.to_str(), None, None, None, None, None).unwrap_err();
        assert!(matches!(err, CheckerError::InvalidOutput(s) if s == "xml"));

        let missing = root.join("missing");
        let err = resolve_effective(missing.to_str(), None, None, None, None, None).unwrap_err();
        assert!(matches!(err, CheckerError::RootNotFound { .. }));

        let file = root.join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = resolve_effective(file.to_str(), None, None, None, None, None).unwrap_err();
        assert!(matches!(err, CheckerError::RootNotDir(_)));
    }
}
