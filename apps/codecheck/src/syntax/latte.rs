//! Latte template checker.
//!
//! Scans `{...}` tags, resolves their names against the known tag set and
//! checks that paired tags nest properly. Expressions inside tags are not
//! parsed, and `n:` attributes are left alone.
//!
//! A `{` opens a tag only when followed by something other than whitespace,
//! a quote, or another brace, so inline scripts written as `{ a: 1 }` pass.

use super::{line_at, TemplateCompiler, TemplateError};

/// Tags that must be closed.
const PAIRED: &[&str] = &[
    "block",
    "cache",
    "capture",
    "define",
    "embed",
    "first",
    "for",
    "foreach",
    "form",
    "formContainer",
    "formContext",
    "if",
    "ifCurrent",
    "ifchanged",
    "ifset",
    "iterateWhile",
    "last",
    "sep",
    "snippet",
    "snippetArea",
    "spaceless",
    "switch",
    "syntax",
    "translate",
    "try",
    "while",
];

/// Tags that may be closed but need not be.
const OPTIONAL: &[&str] = &["label"];

const UNPAIRED: &[&str] = &[
    "breakIf",
    "case",
    "contentType",
    "continueIf",
    "control",
    "debugbreak",
    "default",
    "do",
    "dump",
    "else",
    "elseif",
    "elseifset",
    "exitIf",
    "extends",
    "import",
    "include",
    "includeblock",
    "input",
    "inputError",
    "l",
    "layout",
    "link",
    "parameters",
    "php",
    "plink",
    "r",
    "rollback",
    "sandbox",
    "skipIf",
    "status",
    "templatePrint",
    "templateType",
    "trace",
    "var",
    "varPrint",
    "varType",
];

const IF_FAMILY: &[&str] = &["if", "ifset", "ifchanged", "ifCurrent"];

const ELSE_PARENTS: &[&str] = &[
    "if",
    "ifset",
    "ifchanged",
    "ifCurrent",
    "foreach",
    "first",
    "last",
    "sep",
    "try",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct Latte;

struct Open<'s> {
    name: &'s str,
    pos: usize,
    optional: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct Tag<'s> {
    closing: bool,
    self_closing: bool,
    /// Empty for print tags such as `{$x}` or `{=1}`.
    name: &'s str,
    args: &'s str,
}

impl<'s> Tag<'s> {
    fn parse(inner: &'s str) -> Self {
        let (closing, body) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let self_closing = !closing && inner.trim_end().ends_with('/');
        let b = body.as_bytes();
        let name_len = match b.first() {
            Some(c) if c.is_ascii_alphabetic() => b
                .iter()
                .take_while(|c| c.is_ascii_alphanumeric() || **c == b'_')
                .count(),
            Some(b'_') => 1,
            _ => 0,
        };
        let (name, rest) = body.split_at(name_len);
        let expression = rest.starts_with('(') || rest.starts_with("::") || rest.starts_with('\\');
        let mut args = rest.trim();
        if self_closing {
            args = args.trim_end_matches('/').trim_end();
        }
        Self {
            closing,
            self_closing,
            name: if expression { "" } else { name },
            args,
        }
    }

    fn is_print(&self) -> bool {
        !self.closing && (self.name.is_empty() || (self.name == "_" && !self.args.is_empty()))
    }
}

fn is_known(name: &str) -> bool {
    PAIRED.contains(&name) || OPTIONAL.contains(&name) || UNPAIRED.contains(&name)
}

fn opens_tag(next: Option<u8>) -> bool {
    match next {
        Some(b) => !(b.is_ascii_whitespace() || matches!(b, b'\'' | b'"' | b'{' | b'}')),
        None => false,
    }
}

/// Index of the `}` closing a tag whose body starts at `from`.
fn tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn syntax(message: impl Into<String>, source: &str, pos: usize) -> TemplateError {
    TemplateError::Syntax {
        message: message.into(),
        line: Some(line_at(source, pos)),
    }
}

fn check_tag<'s>(
    tag: &Tag<'s>,
    pos: usize,
    source: &str,
    stack: &mut Vec<Open<'s>>,
) -> Result<(), TemplateError> {
    if tag.is_print() {
        return Ok(());
    }
    if tag.closing {
        if tag.name.is_empty() {
            return match stack.pop() {
                Some(_) => Ok(()),
                None => Err(syntax("Unexpected {/}", source, pos)),
            };
        }
        if tag.name != "_" && !is_known(tag.name) {
            return Err(TemplateError::UnknownConstruct(format!(
                "Unknown macro {{/{}}}",
                tag.name
            )));
        }
        while let Some(top) = stack.last() {
            if top.name == tag.name {
                stack.pop();
                return Ok(());
            }
            if !top.optional {
                return Err(syntax(
                    format!("Unexpected {{/{}}}, expecting {{/{}}}", tag.name, top.name),
                    source,
                    pos,
                ));
            }
            stack.pop();
        }
        return Err(syntax(format!("Unexpected {{/{}}}", tag.name), source, pos));
    }

    if tag.name == "_" {
        if !tag.self_closing {
            stack.push(Open {
                name: "_",
                pos,
                optional: true,
            });
        }
        return Ok(());
    }
    if !is_known(tag.name) {
        return Err(TemplateError::UnknownConstruct(format!(
            "Unknown macro {{{}}}",
            tag.name
        )));
    }

    let parent = stack.iter().rev().find(|o| !o.optional).map(|o| o.name);
    let allowed = match tag.name {
        "else" => parent.is_some_and(|p| ELSE_PARENTS.contains(&p)),
        "elseif" | "elseifset" => parent.is_some_and(|p| IF_FAMILY.contains(&p)),
        "case" => parent == Some("switch"),
        _ => true,
    };
    if !allowed {
        return Err(syntax(format!("Unexpected {{{}}}", tag.name), source, pos));
    }

    if !tag.self_closing {
        if PAIRED.contains(&tag.name) {
            stack.push(Open {
                name: tag.name,
                pos,
                optional: false,
            });
        } else if OPTIONAL.contains(&tag.name) {
            stack.push(Open {
                name: tag.name,
                pos,
                optional: true,
            });
        }
    }
    Ok(())
}

impl TemplateCompiler for Latte {
    fn compile(&self, source: &str) -> Result<(), TemplateError> {
        let bytes = source.as_bytes();
        let mut stack: Vec<Open<'_>> = Vec::new();
        let mut i = 0;
        while let Some(off) = source[i..].find('{') {
            let start = i + off;
            let next = bytes.get(start + 1).copied();
            if next == Some(b'*') {
                let end = source[start + 2..]
                    .find("*}")
                    .ok_or_else(|| syntax("Missing closing *}", source, start))?;
                i = start + 2 + end + 2;
                continue;
            }
            if !opens_tag(next) {
                i = start + 1;
                continue;
            }
            let end = tag_end(bytes, start + 1)
                .ok_or_else(|| syntax("Malformed tag, missing }", source, start))?;
            let tag = Tag::parse(&source[start + 1..end]);
            i = end + 1;
            if tag.name == "syntax" && tag.args == "off" && !tag.closing {
                i = source[i..]
                    .find("{/syntax}")
                    .map_or(source.len(), |p| i + p + "{/syntax}".len());
                continue;
            }
            check_tag(&tag, start, source, &mut stack)?;
        }
        if let Some(open) = stack.iter().rev().find(|o| !o.optional) {
            return Err(syntax(
                format!("Missing {{/{}}}", open.name),
                source,
                open.pos,
            ));
        }
        Ok(())
    }
}
