//! Line-ending normalization, enabled with `--eol`.

use crate::models::{FileContext, Outcome};
use crate::pipeline::Task;

/// Rewrites CRLF and lone CR to `eol`. Shell scripts are left alone.
pub struct LineEndings {
    eol: &'static str,
}

impl LineEndings {
    pub fn new(eol: &'static str) -> Self {
        Self { eol }
    }
}

fn normalize(content: &[u8], eol: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            b'\r' => {
                out.extend_from_slice(eol);
                if content.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => out.extend_from_slice(eol),
            b => out.push(b),
        }
        i += 1;
    }
    out
}

impl Task for LineEndings {
    fn name(&self) -> &'static str {
        "line-endings"
    }

    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome {
        if file.is(&["sh"]) {
            return Outcome::none();
        }
        let next = normalize(content, self.eol.as_bytes());
        if next == content {
            Outcome::none()
        } else {
            Outcome::fixed(next, "contains non-system line-endings")
        }
    }
}
