use crate::models::{Diagnostic, FileContext, Outcome};
use crate::pipeline::Task;
use crate::syntax::{TemplateCompiler, TemplateError};

/// Compiles `.latte` templates. Unknown tags are ignored since the project's
/// own extensions are not loaded here.
pub struct TemplateSyntax {
    compiler: Box<dyn TemplateCompiler>,
}

impl TemplateSyntax {
    pub fn new(compiler: Box<dyn TemplateCompiler>) -> Self {
        Self { compiler }
    }
}

impl Task for TemplateSyntax {
    fn name(&self) -> &'static str {
        "template-syntax"
    }

    fn run(&self, file: &FileContext, content: &[u8]) -> Outcome {
        if !file.is(&["latte"]) {
            return Outcome::none();
        }
        let Ok(source) = std::str::from_utf8(content) else {
            return Outcome::none();
        };
        match self.compiler.compile(source) {
            Ok(()) | Err(TemplateError::UnknownConstruct(_)) => Outcome::none(),
            Err(TemplateError::Syntax { message, line }) => {
                let d = Diagnostic::error(message);
                Outcome::diagnostic(match line {
                    Some(line) => d.at_line(line),
                    None => d,
                })
            }
        }
    }
}
