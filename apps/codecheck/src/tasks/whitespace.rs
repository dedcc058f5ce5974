//! Trailing whitespace removal.

use once_cell::sync::Lazy;

use regex::bytes::Regex;

use super::rtrim;
use crate::models::{FileContext, Outcome};
use crate::pipeline::Task;

static TRAILING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t ]+(\r?\n)").expect("valid regex"));
static EOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("valid regex"));

/// Strips trailing whitespace on every line and ends non-empty content with
/// exactly one line break, reusing the file's first line break style.
pub struct Whitespace {
    native_eol: &'static str,
}

impl Whitespace {
    pub fn new(native_eol: &'static str) -> Self {
        Self { native_eol }
    }
}

impl Task for Whitespace {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn run(&self, _file: &FileContext, content: &[u8]) -> Outcome {
        let stripped = TRAILING.replace_all(content, &b"$1"[..]);
        let eol = EOL
            .find(&stripped)
            .map_or(self.native_eol.as_bytes(), |m| m.as_bytes())
            .to_vec();
        let mut next = rtrim(&stripped).to_vec();
        if !next.is_empty() {
            next.extend_from_slice(&eol);
        }
        if next == content {
            return Outcome::none();
        }
        let delta = content.len() as i64 - next.len() as i64;
        Outcome::fixed(next, format!("{} bytes of whitespaces", delta))
    }
}
