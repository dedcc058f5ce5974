use crate::models::{Diagnostic, FileContext, Outcome};
use crate::pipeline::Task;
use crate::syntax::ConfigDecoder;

/// Decodes config files with the decoder registered for their extension.
pub struct ConfigSyntax {
    decoders: Vec<(String, Box<dyn ConfigDecoder>)>,
}

impl ConfigSyntax {
    pub fn new(decoders: Vec<(String, Box<dyn ConfigDecoder>)>) -> Self {
        Self { decoders }
    }
}

impl Task for ConfigSyntax {
    fn name(&self) -> &'static str {
        "config-syntax"
    }

    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome {
        let Some((_, decoder)) = self.decoders.iter().find(|(ext, _)| ext == file.extension())
        else {
            return Outcome::none();
        };
        let Ok(source) = std::str::from_utf8(content) else {
            return Outcome::none();
        };
        match decoder.decode(source) {
            Ok(()) => Outcome::none(),
            Err(e) => {
                let d = Diagnostic::error(e.message);
                Outcome::diagnostic(match e.line {
                    Some(line) => d.at_line(line),
                    None => d,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::decoder_for;

    fn task(exts: &[&str]) -> ConfigSyntax {
        ConfigSyntax::new(
            exts.iter()
                .map(|e| (e.to_string(), decoder_for(e).unwrap()))
                .collect(),
        )
    }

    #[test]
    fn test_neon_error() {
        let out = task(&["neon"]).run(&FileContext::new("config/common.neon"), b"a: 1\na: 2\n");
        assert!(out.has_error());
        assert_eq!(out.diagnostics[0].to_string(), "Duplicated key 'a' on line 2");
    }

    #[test]
    fn test_json_is_opt_in() {
        let broken = b"{\"a\": }";
        assert!(task(&["neon"])
            .run(&FileContext::new("composer.json"), broken)
            .is_none());
        assert!(task(&["neon", "json"])
            .run(&FileContext::new("composer.json"), broken)
            .has_error());
    }

    #[test]
    fn test_valid_config_passes() {
        let out = task(&["neon"]).run(&FileContext::new("a.neon"), b"services:\n\t- Foo\n");
        assert!(out.is_none());
    }
}
