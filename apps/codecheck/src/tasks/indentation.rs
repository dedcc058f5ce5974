//! Tab/space mixing checks.
//!
//! String literals in PHP may legitimately contain any mix of tabs and
//! spaces, so their blanks are removed before matching. Line breaks inside
//! literals are kept, which keeps reported line numbers exact.

use std::borrow::Cow;

use once_cell::sync::Lazy;

use regex::bytes::Regex;

use super::{line_of, PHP_EXTENSIONS};
use crate::lexer::{tokenize, TokenKind};
use crate::models::{Diagnostic, FileContext, Outcome};
use crate::pipeline::Task;

/// Leading tabs followed by a space, except the ` *` of a doc-block line.
static MIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m-u)^\t* (?:[^*]|$)").expect("valid regex"));
static TABULATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)\S *\t").expect("valid regex"));

pub struct Indentation {
    extensions: Vec<String>,
}

impl Indentation {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

fn strip_string_blanks(content: &[u8]) -> Cow<'_, [u8]> {
    let Ok(source) = std::str::from_utf8(content) else {
        return Cow::Borrowed(content);
    };
    let mut out = Vec::with_capacity(content.len());
    for token in tokenize(source) {
        match token.kind {
            TokenKind::StringLiteral(_) => out.extend(
                token
                    .text
                    .bytes()
                    .filter(|b| !matches!(b, b' ' | b'\t' | b'\r' | 0x0B | 0x0C)),
            ),
            _ => out.extend_from_slice(token.text.as_bytes()),
        }
    }
    Cow::Owned(out)
}

impl Task for Indentation {
    fn name(&self) -> &'static str {
        "indentation"
    }

    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome {
        if !self.extensions.iter().any(|e| e == file.extension()) || !content.contains(&b'\t') {
            return Outcome::none();
        }
        let content = if file.is(PHP_EXTENSIONS) {
            strip_string_blanks(content)
        } else {
            Cow::Borrowed(content)
        };

        let mut out = Outcome::none();
        if let Some(m) = MIXED.find(&content) {
            out.push(
                Diagnostic::error("mixed tabs and spaces indentation")
                    .at_line(line_of(&content, m.start())),
            );
        }
        if let Some(m) = TABULATOR.find(&content) {
            out.push(Diagnostic::error("tabulator found").at_line(line_of(&content, m.start())));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskOptions;

    fn run(path: &str, content: &str) -> Outcome {
        Indentation::new(TaskOptions::default().indentation)
            .run(&FileContext::new(path), content.as_bytes())
    }

    fn messages(out: &Outcome) -> Vec<String> {
        out.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_mixed_indentation() {
        let out = run("a.js", "ok();\n\t \tx();\n");
        assert_eq!(messages(&out)[0], "mixed tabs and spaces indentation on line 2");
        assert!(out.has_error());
    }

    #[test]
    fn test_tabulator_after_text() {
        let out = run("a.css", "a {\n\tcolor: red;\n}\nx \t/* c */\n");
        assert_eq!(messages(&out), vec!["tabulator found on line 4"]);
    }

    #[test]
    fn test_doc_block_continuation_passes() {
        assert!(run("a.php", "<?php\n/**\n\t * comment\n\t */\n").is_none());
        assert!(run("a.php", "<?php\nclass A\n{\n\tpublic $a;\n}\n").is_none());
    }

    #[test]
    fn test_both_rules_report_independently() {
        let out = run("a.less", "\t x\ny\t\n");
        assert_eq!(
            messages(&out),
            vec![
                "mixed tabs and spaces indentation on line 1",
                "tabulator found on line 2",
            ]
        );
    }

    #[test]
    fn test_php_string_contents_ignored() {
        let src = "<?php\n$a = \"x\t \ty\";\n$b = '\t a';\n$c = <<<EOT\n\t  text\nEOT;\n\t$d = 1;\n";
        assert!(run("a.php", src).is_none());
        let out = run("a.php", "<?php\n$a = '\n\n';\nfoo();\t// x\n");
        assert_eq!(messages(&out), vec!["tabulator found on line 5"]);
    }

    #[test]
    fn test_only_configured_extensions_with_tabs() {
        assert!(run("a.txt", "\t x").is_none());
        assert!(run("a.js", "  x\n    y\n").is_none());
        let custom = Indentation::new(vec!["txt".into()]);
        assert!(custom.run(&FileContext::new("a.txt"), b"\t x").has_error());
    }
}
