//! Session error types.
//!
//! Only infrastructure failures are errors. A compile that the pipeline
//! rejected is stored as a `Failed` result and returned as `Ok`.

use scriptc_core::{CoreError, SourceId};

use crate::pipeline::PipelineError;

/// Errors returned by [`CompilationSession`](crate::CompilationSession).
///
/// Every operation that returns an error leaves the registry exactly as it
/// was before the call.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The pipeline could not produce any result.
    #[error(transparent)]
    Compile(#[from] PipelineError),

    /// The operation needs a prior compile of this source.
    #[error("no compilation result for source '{0}'")]
    NoPriorResult(SourceId),

    /// Another compile of the same source has not finished yet.
    #[error("compile already in progress for source '{0}'")]
    CompileInProgress(SourceId),

    /// The pipeline reported success without producing an artifact.
    #[error("pipeline reported success for '{0}' but produced no artifact")]
    MissingArtifact(SourceId),

    /// Malformed diagnostic range or invalid selection index.
    #[error(transparent)]
    Core(#[from] CoreError),
}
