//! CLI argument parsing via `clap`.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "codecheck",
    version,
    about = "Checks and fixes PHP project source trees",
    long_about = "codecheck scans a folder for source files and checks encoding, whitespace, indentation, PHP strings and comments, Latte templates and NEON configs. Fixable problems are only reported unless --fix is given.\n\nConfiguration precedence: CLI > codecheck.toml > defaults.",
    after_help = "Examples:\n  codecheck\n  codecheck -d app --fix\n  codecheck --eol --output json\n  CODECHECK_LOG=debug codecheck --parallel"
)]
/// Command-line options. Absent flags fall back to the config file.
pub struct Cli {
    #[arg(short = 'd', long, value_name = "DIR", help = "Folder to scan (default: current dir)")]
    pub root: Option<String>,
    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Fix files (default: only report)")]
    pub fix: bool,
    #[arg(short = 'l', long, action = clap::ArgAction::SetTrue, help = "Convert line endings to the system's")]
    pub eol: bool,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Check files in parallel")]
    pub parallel: bool,
    #[arg(long, value_name = "FILTER", help = "Log filter, e.g. info or codecheck=debug (default: warn)")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["codecheck", "-d", "app", "-f", "-l", "--output", "json"])
            .unwrap();
        assert_eq!(cli.root.as_deref(), Some("app"));
        assert!(cli.fix && cli.eol && !cli.parallel);
        assert_eq!(cli.output.as_deref(), Some("json"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["codecheck"]).unwrap();
        assert!(cli.root.is_none() && !cli.fix && cli.log_level.is_none());
    }
}
