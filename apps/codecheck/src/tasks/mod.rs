//! Built-in check-and-fix tasks and the default task order.
//!
//! - `encoding`: control characters, BOM, UTF-8 validity.
//! - `php`: doc-comment shape, escape sequences, trailing `?>`.
//! - `line_endings`: optional EOL normalization.
//! - `template`: Latte syntax.
//! - `config_syntax`: NEON (and opt-in JSON/YAML/TOML) syntax.
//! - `whitespace`: trailing whitespace and final newline.
//! - `indentation`: tab/space mixing.

pub mod config_syntax;
pub mod encoding;
pub mod indentation;
pub mod line_endings;
pub mod php;
pub mod template;
pub mod whitespace;

use crate::error::CheckerError;
use crate::pipeline::Task;
use crate::syntax::{self, latte::Latte};

/// Extensions handled by the PHP-aware tasks.
pub const PHP_EXTENSIONS: &[&str] = &["php", "phpt"];

/// Line separator of the host platform.
pub const NATIVE_EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Options that shape the task list for a run.
#[derive(Debug, Clone)]
pub struct TaskOptions {
    /// Register the line-ending normalizer.
    pub eol: bool,
    /// Extensions checked for tab/space mixing.
    pub indentation: Vec<String>,
    /// Extensions validated by a config decoder of the same name.
    pub config_syntax: Vec<String>,
    /// Line separator used when content has none yet.
    pub native_eol: &'static str,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            eol: false,
            indentation: ["php", "phpt", "css", "less", "js", "json", "neon"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            config_syntax: vec!["neon".to_string()],
            native_eol: NATIVE_EOL,
        }
    }
}

/// Assemble the ordered task list. Fails when a config syntax has no decoder.
pub fn default_tasks(options: &TaskOptions) -> Result<Vec<Box<dyn Task>>, CheckerError> {
    let mut decoders = Vec::new();
    for ext in &options.config_syntax {
        let decoder =
            syntax::decoder_for(ext).ok_or_else(|| CheckerError::UnknownSyntax(ext.clone()))?;
        decoders.push((ext.clone(), decoder));
    }

    let mut tasks: Vec<Box<dyn Task>> = vec![
        Box::new(encoding::ControlCharacters),
        Box::new(encoding::ByteOrderMark),
        Box::new(encoding::Utf8Encoding),
        Box::new(php::PhpDocComments),
        Box::new(php::EscapeSequences),
    ];
    if options.eol {
        tasks.push(Box::new(line_endings::LineEndings::new(options.native_eol)));
    }
    tasks.push(Box::new(php::ClosingTag));
    tasks.push(Box::new(template::TemplateSyntax::new(Box::new(Latte))));
    tasks.push(Box::new(config_syntax::ConfigSyntax::new(decoders)));
    tasks.push(Box::new(whitespace::Whitespace::new(options.native_eol)));
    tasks.push(Box::new(indentation::Indentation::new(
        options.indentation.clone(),
    )));
    Ok(tasks)
}

/// Trim trailing space, tab, LF, CR, NUL and vertical tab.
pub(crate) fn rtrim(content: &[u8]) -> &[u8] {
    let end = content
        .iter()
        .rposition(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\0' | 0x0B))
        .map_or(0, |p| p + 1);
    &content[..end]
}

/// 1-based line of byte offset `pos`.
pub(crate) fn line_of(content: &[u8], pos: usize) -> usize {
    content[..pos.min(content.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileContext;
    use crate::pipeline::{check_file, Mode};

    fn names(tasks: &[Box<dyn Task>]) -> Vec<&'static str> {
        tasks.iter().map(|t| t.name()).collect()
    }

    #[test]
    fn test_default_order() {
        let tasks = default_tasks(&TaskOptions::default()).unwrap();
        assert_eq!(
            names(&tasks),
            vec![
                "control-characters",
                "bom",
                "utf8",
                "phpdoc",
                "escape-sequences",
                "closing-tag",
                "template-syntax",
                "config-syntax",
                "whitespace",
                "indentation",
            ]
        );
    }

    #[test]
    fn test_eol_task_runs_after_escape_check() {
        let options = TaskOptions {
            eol: true,
            ..TaskOptions::default()
        };
        let tasks = default_tasks(&options).unwrap();
        assert_eq!(names(&tasks)[5], "line-endings");
        assert_eq!(tasks.len(), 11);
    }

    #[test]
    fn test_unknown_config_syntax_is_fatal() {
        let options = TaskOptions {
            config_syntax: vec!["ini".into()],
            ..TaskOptions::default()
        };
        assert!(matches!(
            default_tasks(&options),
            Err(CheckerError::UnknownSyntax(s)) if s == "ini"
        ));
    }

    #[test]
    fn test_rtrim_and_line_of() {
        assert_eq!(rtrim(b"a b \t\r\n\0\x0B"), b"a b");
        assert_eq!(rtrim(b" \n"), b"");
        assert_eq!(line_of(b"a\nb\nc", 4), 3);
        assert_eq!(line_of(b"abc", 0), 1);
    }

    fn fix_all(path: &str, content: &[u8]) -> Vec<u8> {
        let options = TaskOptions {
            native_eol: "\n",
            ..TaskOptions::default()
        };
        let tasks = default_tasks(&options).unwrap();
        let file = FileContext::new(path);
        check_file(&file, content, &tasks, Mode::Fix, &mut |_| {}).content
    }

    // Stacked trailing `?>` tags are an exception: one goes per pass.
    #[test]
    fn test_fixing_is_idempotent() {
        let inputs: &[(&str, &[u8])] = &[
            ("a.php", b"\xEF\xBB\xBF<?php\necho 1;  \n\n\n?>\n\n"),
            ("b.txt", b"line  \r\nnext\t\r\n\r\n"),
            ("c.md", b"   "),
            ("d.latte", b"{if 1}x{/if}   \n"),
        ];
        for (path, input) in inputs {
            let once = fix_all(path, input);
            let twice = fix_all(path, &once);
            assert_eq!(once, twice, "{path}");
        }
    }

    #[test]
    fn test_bom_then_whitespace_diagnostic_order() {
        let options = TaskOptions {
            native_eol: "\n",
            ..TaskOptions::default()
        };
        let tasks = default_tasks(&options).unwrap();
        let mut seen = Vec::new();
        let report = check_file(
            &FileContext::new("x.txt"),
            b"\xEF\xBB\xBFhello   \n\n\n",
            &tasks,
            Mode::Fix,
            &mut |d| seen.push(d.message.clone()),
        );
        assert_eq!(report.content, b"hello\n");
        assert_eq!(seen, vec!["contains BOM", "5 bytes of whitespaces"]);
    }
}
