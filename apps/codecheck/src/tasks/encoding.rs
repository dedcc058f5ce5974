//! Byte-level content checks that run before anything parses the file.

use super::line_of;
use crate::models::{Diagnostic, FileContext, Outcome};
use crate::pipeline::Task;

const BOM: &[u8] = b"\xEF\xBB\xBF";

fn is_control(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F)
}

/// Rejects control characters other than tab, LF and CR.
pub struct ControlCharacters;

impl Task for ControlCharacters {
    fn name(&self) -> &'static str {
        "control-characters"
    }

    fn run(&self, _file: &FileContext, content: &[u8]) -> Outcome {
        match content.iter().position(|b| is_control(*b)) {
            Some(pos) => Outcome::diagnostic(
                Diagnostic::error("contains control characters").at_line(line_of(content, pos)),
            ),
            None => Outcome::none(),
        }
    }
}

/// Strips a leading UTF-8 byte-order mark.
pub struct ByteOrderMark;

impl Task for ByteOrderMark {
    fn name(&self) -> &'static str {
        "bom"
    }

    fn run(&self, _file: &FileContext, content: &[u8]) -> Outcome {
        match content.strip_prefix(BOM) {
            Some(rest) => Outcome::fixed(rest.to_vec(), "contains BOM"),
            None => Outcome::none(),
        }
    }
}

pub struct Utf8Encoding;

impl Task for Utf8Encoding {
    fn name(&self) -> &'static str {
        "utf8"
    }

    fn run(&self, _file: &FileContext, content: &[u8]) -> Outcome {
        match std::str::from_utf8(content) {
            Ok(_) => Outcome::none(),
            Err(_) => Outcome::diagnostic(Diagnostic::error("is not valid UTF-8 file")),
        }
    }
}
