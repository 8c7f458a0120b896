//! Graph, export and render error types.
//!
//! Export and render failures are kept apart from compile failures: a
//! missing renderer is reported as a [`RenderError`], never as a problem
//! with the script.

use std::path::PathBuf;

use scriptc_core::SourceId;

/// Errors building, producing or parsing a graph description.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A node id was declared twice.
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    /// An edge referenced a node id that was never declared.
    #[error("unknown node id '{0}'")]
    UnknownNode(String),

    /// DOT text did not match the supported grammar.
    #[error("DOT parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The graph producer could not describe the artifact.
    #[error("graph producer failed: {0}")]
    Producer(String),
}

/// Errors from [`GraphExporter::export_graph`](crate::GraphExporter::export_graph).
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The source was never compiled.
    #[error("no compilation result for source '{0}'")]
    NoPriorResult(SourceId),

    /// The latest compile of the source failed, so there is nothing to export.
    #[error("source '{0}' has no compiled artifact (last compile failed)")]
    NoArtifact(SourceId),

    /// The graph producer itself failed.
    #[error("graph producer failed for '{source_id}'")]
    PipelineFailure {
        source_id: SourceId,
        #[source]
        source: GraphError,
    },

    /// The DOT file could not be written.
    #[error("failed to write graph to {}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from rendering an exported graph to an image.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Exporting the DOT input failed.
    #[error("graph export failed")]
    ExporterFailed(#[from] ExportError),

    /// The renderer does not produce this image format.
    #[error("unsupported image format '{0}'")]
    UnsupportedFormat(String),

    /// The image path would be the DOT input itself.
    #[error("image output would overwrite the DOT input {}", .0.display())]
    OutputOverwritesInput(PathBuf),

    /// The renderer executable could not be launched.
    #[error("graph renderer '{}' could not be launched", .program.display())]
    RendererMissing {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer ran but reported failure.
    #[error("graph renderer exited with {}: {stderr}", describe_exit(.code))]
    RendererNonZeroExit { code: Option<i32>, stderr: String },

    /// The renderer succeeded but left no readable image behind.
    #[error("rendered image {} could not be loaded: {reason}", .path.display())]
    ImageLoadFailure { path: PathBuf, reason: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}
