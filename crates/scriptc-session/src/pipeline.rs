//! The contract a compiler pipeline exposes to a session.
//!
//! The pipeline (lexer, parser, checker, codegen) is opaque here. It must be
//! callable repeatedly with no hidden state carried between calls beyond what
//! [`CompileOptions`] supplies.

use serde::{Deserialize, Serialize};

use scriptc_core::Severity;

/// Default tab width used when computing diagnostic columns.
pub const DEFAULT_TAB_WIDTH: u32 = 4;

fn default_tab_width() -> u32 {
    DEFAULT_TAB_WIDTH
}

/// Environment parameters passed to the pipeline, immutable for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Column width of a tab stop.
    #[serde(default = "default_tab_width")]
    pub tab_width: u32,

    /// Record a run that emitted warnings as failed and drop its artifact.
    #[serde(default)]
    pub deny_warnings: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            tab_width: DEFAULT_TAB_WIDTH,
            deny_warnings: false,
        }
    }
}

/// Whether the pipeline accepted the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Failed,
}

/// A diagnostic as emitted by the pipeline, before range validation.
///
/// Coordinates are 1-based; the end position is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineMessage {
    pub severity: Severity,
    pub text: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl PipelineMessage {
    /// A message spanning `width` columns of one line.
    pub fn on_line(
        severity: Severity,
        text: impl Into<String>,
        line: u32,
        column: u32,
        width: u32,
    ) -> Self {
        PipelineMessage {
            severity,
            text: text.into(),
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column.saturating_add(width),
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutput<A> {
    pub status: PipelineStatus,
    /// Messages in emission order.
    pub messages: Vec<PipelineMessage>,
    /// Compiled artifact; expected only with [`PipelineStatus::Success`].
    pub artifact: Option<A>,
}

impl<A> PipelineOutput<A> {
    pub fn success(messages: Vec<PipelineMessage>, artifact: A) -> Self {
        PipelineOutput {
            status: PipelineStatus::Success,
            messages,
            artifact: Some(artifact),
        }
    }

    pub fn failed(messages: Vec<PipelineMessage>) -> Self {
        PipelineOutput {
            status: PipelineStatus::Failed,
            messages,
            artifact: None,
        }
    }
}

/// The pipeline could not produce any result at all.
///
/// Distinct from a run that produced [`PipelineStatus::Failed`] with
/// diagnostics, which is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("compiler pipeline failed: {reason}")]
pub struct PipelineError {
    pub reason: String,
}

impl PipelineError {
    pub fn new(reason: impl Into<String>) -> Self {
        PipelineError {
            reason: reason.into(),
        }
    }
}

/// A compiler pipeline callable by a [`CompilationSession`].
///
/// [`CompilationSession`]: crate::CompilationSession
pub trait CompilerPipeline {
    /// Opaque compiled output, consumed only by graph export.
    type Artifact;

    fn compile(
        &self,
        source_text: &str,
        options: &CompileOptions,
    ) -> Result<PipelineOutput<Self::Artifact>, PipelineError>;
}

impl<P: CompilerPipeline + ?Sized> CompilerPipeline for &P {
    type Artifact = P::Artifact;

    fn compile(
        &self,
        source_text: &str,
        options: &CompileOptions,
    ) -> Result<PipelineOutput<Self::Artifact>, PipelineError> {
        (**self).compile(source_text, options)
    }
}
