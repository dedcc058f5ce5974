//! PHP-aware tasks built on the token stream.

use once_cell::sync::Lazy;

use regex::bytes::Regex as BytesRegex;
use regex::Regex;

use super::{rtrim, PHP_EXTENSIONS};
use crate::lexer::{tokenize, StringStyle, TokenKind};
use crate::models::{Diagnostic, FileContext, Outcome};
use crate::pipeline::Task;

/// A block comment that looks like a doc comment but opens with `/*`.
static PHPDOC_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^/\*\s.*@[a-z]").expect("valid regex"));

/// Longest run of valid escapes in a double-quoted literal.
static VALID_ESCAPES: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r"(?-u)^(?:[^\\]|\\[\\nrtvefx0-7\W])*").expect("valid regex")
});

fn php_source<'c>(file: &FileContext, content: &'c [u8]) -> Option<&'c str> {
    if !file.is(PHP_EXTENSIONS) {
        return None;
    }
    std::str::from_utf8(content).ok()
}

/// Warns about `/* ... @tag` comments that were meant to be `/** ... */`.
pub struct PhpDocComments;

impl Task for PhpDocComments {
    fn name(&self) -> &'static str {
        "phpdoc"
    }

    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome {
        let Some(source) = php_source(file, content) else {
            return Outcome::none();
        };
        let mut out = Outcome::none();
        for token in tokenize(source) {
            if token.kind == TokenKind::Comment && PHPDOC_LIKE.is_match(token.text) {
                out.push(Diagnostic::warning("missing /** in phpDoc comment").at_line(token.line));
            }
        }
        out
    }
}

/// Warns about unknown backslash escapes in interpolating strings.
pub struct EscapeSequences;

impl Task for EscapeSequences {
    fn name(&self) -> &'static str {
        "escape-sequences"
    }

    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome {
        let Some(source) = php_source(file, content) else {
            return Outcome::none();
        };
        let mut out = Outcome::none();
        for token in tokenize(source) {
            if !matches!(
                token.kind,
                TokenKind::StringLiteral(StringStyle::DoubleQuoted | StringStyle::Interpolated)
            ) {
                continue;
            }
            let text = token.text.as_bytes();
            let end = VALID_ESCAPES.find(text).map_or(0, |m| m.end());
            if end < text.len() {
                let seq = text.get(end..end + 2).unwrap_or(&text[end..]);
                out.push(
                    Diagnostic::warning(format!(
                        "invalid escape sequence {} in double quoted string",
                        String::from_utf8_lossy(seq)
                    ))
                    .at_line(token.line),
                );
            }
        }
        out
    }
}

/// Removes a `?>` that ends the file. Only the last tag goes per pass, so
/// `?>\n?>` at the end needs two runs.
pub struct ClosingTag;

impl Task for ClosingTag {
    fn name(&self) -> &'static str {
        "closing-tag"
    }

    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome {
        if !file.is(PHP_EXTENSIONS) {
            return Outcome::none();
        }
        let trimmed = rtrim(content);
        match trimmed.strip_suffix(b"?>") {
            Some(rest) => Outcome::fixed(rest.to_vec(), "contains closing PHP tag ?>"),
            None => Outcome::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn php(task: &dyn Task, src: &str) -> Outcome {
        task.run(&FileContext::new("src/a.php"), src.as_bytes())
    }

    fn messages(out: &Outcome) -> Vec<String> {
        out.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_phpdoc_shape() {
        let src = "<?php\n/* @var int */\n$a = 1;\n/** @var int */\n/* plain */\n// @todo\n";
        let out = php(&PhpDocComments, src);
        assert_eq!(messages(&out), vec!["missing /** in phpDoc comment on line 2"]);
        assert_eq!(out.diagnostics[0].severity, Severity::Warning);
        // inline HTML is not code
        assert!(php(&PhpDocComments, "/* @var x */").is_none());
    }

    #[test]
    fn test_invalid_escape_warns() {
        let out = php(&EscapeSequences, "<?php\n\n$a = \"\\q\";\n");
        assert_eq!(
            messages(&out),
            vec!["invalid escape sequence \\q in double quoted string on line 3"]
        );
    }

    #[test]
    fn test_valid_escapes_pass() {
        let src = "<?php\n$a = \"\\n\\t\\\\\\$\\x41\\0\\{\";\n$b = '\\q';\n$c = <<<'N'\n\\q\nN;\n";
        assert!(php(&EscapeSequences, src).is_none());
    }

    #[test]
    fn test_escape_in_interpolated_and_heredoc() {
        let out = php(&EscapeSequences, "<?php\n$a = \"$x \\d\";\n$b = <<<EOT\n\\w\nEOT;\n");
        assert_eq!(
            messages(&out),
            vec![
                "invalid escape sequence \\d in double quoted string on line 2",
                "invalid escape sequence \\w in double quoted string on line 4",
            ]
        );
    }

    #[test]
    fn test_only_first_invalid_escape_per_literal() {
        let out = php(&EscapeSequences, "<?php \"\\a\\b\";");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("\\a"));
    }

    #[test]
    fn test_closing_tag_removed() {
        let out = php(&ClosingTag, "<?php\necho 1;\n?>\n\n");
        assert_eq!(out.replacement.as_deref(), Some(&b"<?php\necho 1;\n"[..]));
        assert_eq!(out.diagnostics[0].message, "contains closing PHP tag ?>");
        assert!(php(&ClosingTag, "<?php\necho 1;\n").is_none());
        assert!(php(&ClosingTag, "<?php ?>\n<p>html</p>\n").is_none());
    }

    #[test]
    fn test_closing_tag_removes_one_tag_per_pass() {
        let once = php(&ClosingTag, "<?php echo 1; ?>\n?>\n").replacement.unwrap();
        assert_eq!(once, b"<?php echo 1; ?>\n");
        let twice = ClosingTag.run(&FileContext::new("src/a.php"), &once);
        assert_eq!(twice.replacement.as_deref(), Some(&b"<?php echo 1; "[..]));
    }

    #[test]
    fn test_other_extensions_are_skipped() {
        let file = FileContext::new("a.txt");
        assert!(ClosingTag.run(&file, b"?>").is_none());
        assert!(EscapeSequences.run(&file, b"<?php \"\\q\";").is_none());
    }
}
