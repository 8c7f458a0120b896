//! [`CompilerPipeline`] implementation for the script language.

use scriptc_core::Severity;
use scriptc_session::{
    CompileOptions, CompilerPipeline, PipelineError, PipelineMessage, PipelineOutput,
};

use crate::checker::check;
use crate::error::SyntaxError;
use crate::lexer::lex_line;
use crate::parser::parse_line;
use crate::program::Program;

/// Lexes, parses and checks a whole script.
///
/// Stateless; one value can serve any number of sessions and threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptPipeline;

impl ScriptPipeline {
    pub fn new() -> Self {
        ScriptPipeline
    }
}

fn syntax_message(line: u32, err: SyntaxError) -> PipelineMessage {
    PipelineMessage::on_line(Severity::Error, err.message, line, err.col, err.width)
}

impl CompilerPipeline for ScriptPipeline {
    type Artifact = Program;

    fn compile(
        &self,
        source_text: &str,
        options: &CompileOptions,
    ) -> Result<PipelineOutput<Program>, PipelineError> {
        if options.tab_width == 0 {
            return Err(PipelineError::new("tab width must be at least 1"));
        }

        let mut messages = Vec::new();
        let mut statements = Vec::new();

        for (i, raw) in source_text.split('\n').enumerate() {
            let line = u32::try_from(i + 1)
                .map_err(|_| PipelineError::new("source has too many lines"))?;
            let text = raw.strip_suffix('\r').unwrap_or(raw);

            let lexed = match lex_line(text, options.tab_width) {
                Ok(lexed) => lexed,
                Err(errors) => {
                    messages.extend(errors.into_iter().map(|e| syntax_message(line, e)));
                    continue;
                }
            };
            match parse_line(&lexed, line) {
                Ok(Some(stmt)) => statements.push(stmt),
                Ok(None) => {}
                Err(e) => messages.push(syntax_message(line, e)),
            }
        }

        // Names are only resolved once the whole script parsed.
        if messages.is_empty() {
            if statements.is_empty() {
                messages.push(PipelineMessage::on_line(
                    Severity::Info,
                    "script contains no statements",
                    1,
                    1,
                    0,
                ));
            } else {
                messages.extend(check(&statements));
            }
        }

        let errors = messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
            .count();
        tracing::debug!(
            statements = statements.len(),
            messages = messages.len(),
            errors,
            "script pipeline finished"
        );

        if errors > 0 {
            Ok(PipelineOutput::failed(messages))
        } else {
            Ok(PipelineOutput::success(messages, Program::new(statements)))
        }
    }
}
