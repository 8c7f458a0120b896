//! Graph export against a compilation session.

use std::io::Write;
use std::path::{Path, PathBuf};

use scriptc_core::SourceId;
use scriptc_session::{CompilationSession, CompilerPipeline};

use crate::description::GraphProducer;
use crate::dot::to_dot;
use crate::error::{ExportError, RenderError};
use crate::render::Renderer;

/// Writes the graph of a source's latest successful compile as DOT, and
/// optionally renders it to an image.
///
/// The exporter only reads the session; it never triggers a compile.
#[derive(Debug, Clone)]
pub struct GraphExporter<G> {
    producer: G,
    renderer: Renderer,
}

impl<G> GraphExporter<G> {
    /// Exporter using the default renderer (`dot`).
    pub fn new(producer: G) -> Self {
        Self::with_renderer(producer, Renderer::default())
    }

    pub fn with_renderer(producer: G, renderer: Renderer) -> Self {
        GraphExporter { producer, renderer }
    }

    pub fn producer(&self) -> &G {
        &self.producer
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Writes the DOT description of `source_id`'s artifact to `output_path`.
    ///
    /// The whole document is built in memory and then swapped into place, so
    /// `output_path` either keeps its previous content or holds the complete
    /// new graph.
    pub fn export_graph<P>(
        &self,
        session: &CompilationSession<P>,
        source_id: &SourceId,
        output_path: &Path,
    ) -> Result<(), ExportError>
    where
        P: CompilerPipeline,
        G: GraphProducer<P::Artifact>,
    {
        let artifact = match session.artifact(source_id) {
            Some(artifact) => artifact,
            None if session.has_result(source_id) => {
                tracing::warn!(source = %source_id, "export requested after a failed compile");
                return Err(ExportError::NoArtifact(source_id.clone()));
            }
            None => {
                tracing::warn!(source = %source_id, "export requested before any compile");
                return Err(ExportError::NoPriorResult(source_id.clone()));
            }
        };

        let graph = self
            .producer
            .produce_graph(&*artifact)
            .map_err(|source| ExportError::PipelineFailure {
                source_id: source_id.clone(),
                source,
            })?;

        let dot = to_dot(&graph);
        write_atomically(output_path, dot.as_bytes())?;
        tracing::info!(
            source = %source_id,
            path = %output_path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "exported graph"
        );
        Ok(())
    }

    /// Exports to `temp_path`, then renders the image next to it with the
    /// extension replaced by `image_format`. Returns the image path.
    ///
    /// A `temp_path` that already carries the image extension is rejected
    /// before anything is written, since the image would overwrite its input.
    pub fn export_and_render<P>(
        &self,
        session: &CompilationSession<P>,
        source_id: &SourceId,
        temp_path: &Path,
        image_format: &str,
    ) -> Result<PathBuf, RenderError>
    where
        P: CompilerPipeline,
        G: GraphProducer<P::Artifact>,
    {
        Renderer::check_format(image_format)?;
        let collides = temp_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(image_format));
        if collides {
            return Err(RenderError::OutputOverwritesInput(temp_path.to_path_buf()));
        }
        self.export_graph(session, source_id, temp_path)?;

        let image_path = temp_path.with_extension(image_format);
        self.renderer.render(temp_path, &image_path, image_format)?;
        Ok(image_path)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let write_failure = |source: std::io::Error| ExportError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".scriptc-export-")
        .tempfile_in(dir)
        .map_err(write_failure)?;
    tmp.write_all(bytes).map_err(write_failure)?;
    tmp.as_file().sync_all().map_err(write_failure)?;
    tmp.persist(path).map_err(|e| write_failure(e.error))?;
    Ok(())
}
