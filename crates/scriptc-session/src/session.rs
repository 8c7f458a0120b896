//! The compile / status / selection surface exposed to an editor shell.
//!
//! [`CompilationSession`] is the single write path to its
//! [`SourceRegistry`]. All methods take `&self`; a session can be shared
//! between threads behind an `Arc`.
//!
//! # Concurrency
//!
//! Compiles of different sources run in parallel. At most one compile per
//! source is in flight: a second request for a source that is still being
//! compiled is rejected with [`SessionError::CompileInProgress`] rather than
//! queued. The registry is never locked while the pipeline runs.

use std::sync::Arc;

use scriptc_core::{
    CompilationResult, CoreError, DiagnosticMessage, DiagnosticSet, SourceHash, SourceId,
    SourceRange, Status,
};

use crate::error::SessionError;
use crate::in_flight::InFlight;
use crate::pipeline::{CompileOptions, CompilerPipeline, PipelineMessage, PipelineStatus};
use crate::registry::SourceRegistry;
use crate::selection::{EditorBuffer, SelectionBridge, SelectionCommand};

/// Drives a compiler pipeline and remembers the latest result per source.
pub struct CompilationSession<P: CompilerPipeline> {
    pipeline: P,
    registry: SourceRegistry<P::Artifact>,
    in_flight: InFlight,
}

impl<P: CompilerPipeline> CompilationSession<P> {
    /// Creates a session with an empty registry.
    pub fn new(pipeline: P) -> Self {
        CompilationSession {
            pipeline,
            registry: SourceRegistry::new(),
            in_flight: InFlight::new(),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Read access to the stored results.
    pub fn registry(&self) -> &SourceRegistry<P::Artifact> {
        &self.registry
    }

    /// Compiles `source_text` as the current content of `source_id`.
    ///
    /// A run the pipeline rejected is returned as `Ok` with
    /// [`Status::Failed`] and its diagnostics. The new result replaces any
    /// earlier one for the same source; nothing is merged. On `Err` the
    /// registry is untouched.
    pub fn compile(
        &self,
        source_id: &SourceId,
        source_text: &str,
        options: &CompileOptions,
    ) -> Result<CompilationResult<P::Artifact>, SessionError> {
        let _guard = self.in_flight.try_acquire(source_id).ok_or_else(|| {
            tracing::warn!(source = %source_id, "rejected overlapping compile");
            SessionError::CompileInProgress(source_id.clone())
        })?;

        tracing::debug!(source = %source_id, bytes = source_text.len(), "compiling");
        let output = self.pipeline.compile(source_text, options).map_err(|e| {
            tracing::warn!(source = %source_id, error = %e, "pipeline produced no result");
            SessionError::from(e)
        })?;

        let diagnostics = build_diagnostics(output.messages)?;
        let source_hash = SourceHash::of(source_text);

        let result = match (output.status, output.artifact) {
            (PipelineStatus::Success, Some(_))
                if options.deny_warnings && diagnostics.warning_count() > 0 =>
            {
                CompilationResult::failed(diagnostics, source_hash)
            }
            (PipelineStatus::Success, Some(artifact)) => {
                CompilationResult::success(diagnostics, artifact, source_hash)
            }
            (PipelineStatus::Success, None) => {
                return Err(SessionError::MissingArtifact(source_id.clone()));
            }
            (PipelineStatus::Failed, _) => CompilationResult::failed(diagnostics, source_hash),
        };

        let (errors, warnings) = result.diagnostics().counts();
        tracing::info!(
            source = %source_id,
            status = %result.status(),
            errors,
            warnings,
            "compile finished"
        );

        self.registry.replace(source_id.clone(), result.clone());
        Ok(result)
    }

    /// Whether any compile (of any outcome) has been recorded for `source_id`.
    pub fn has_result(&self, source_id: &SourceId) -> bool {
        self.registry.contains(source_id)
    }

    /// Status of the latest compile, [`Status::Uncompiled`] if there was none.
    pub fn status(&self, source_id: &SourceId) -> Status {
        self.registry.status(source_id)
    }

    /// `(error_count, warning_count)` of the latest compile.
    pub fn counts(&self, source_id: &SourceId) -> Option<(usize, usize)> {
        self.registry
            .with_entry(source_id, |r| r.diagnostics().counts())
    }

    pub fn result(&self, source_id: &SourceId) -> Option<CompilationResult<P::Artifact>> {
        self.registry.get(source_id)
    }

    pub fn diagnostics(&self, source_id: &SourceId) -> Option<DiagnosticSet> {
        self.registry
            .with_entry(source_id, |r| r.diagnostics().clone())
    }

    /// The artifact of the latest compile, if it succeeded.
    pub fn artifact(&self, source_id: &SourceId) -> Option<Arc<P::Artifact>> {
        self.registry
            .with_entry(source_id, |r| r.artifact().cloned())
            .flatten()
    }

    /// Whether `current_text` differs from the text last compiled for
    /// `source_id`; `None` if it was never compiled.
    pub fn is_stale(&self, source_id: &SourceId, current_text: &str) -> Option<bool> {
        self.registry
            .with_entry(source_id, |r| r.is_stale(current_text))
    }

    /// Forgets the result for `source_id`, e.g. when its buffer is closed.
    pub fn discard(&self, source_id: &SourceId) -> bool {
        let removed = self.registry.discard(source_id);
        if removed {
            tracing::debug!(source = %source_id, "discarded compilation result");
        }
        removed
    }

    /// Makes diagnostic `index` active and returns the selection for it.
    ///
    /// The command is computed after the active index has been updated. An
    /// invalid index leaves the active index unchanged.
    pub fn set_active(
        &self,
        source_id: &SourceId,
        index: usize,
    ) -> Result<SelectionCommand, SessionError> {
        let command = self
            .registry
            .with_entry_mut(source_id, |r| activate(r.diagnostics_mut(), index))
            .ok_or_else(|| SessionError::NoPriorResult(source_id.clone()))??;
        Ok(command)
    }

    /// [`set_active`](Self::set_active), then dispatches the selection to
    /// the editor buffer.
    pub fn select_diagnostic<B: EditorBuffer + ?Sized>(
        &self,
        source_id: &SourceId,
        index: usize,
        buffer: &mut B,
    ) -> Result<SelectionCommand, SessionError> {
        let command = self.set_active(source_id, index)?;
        buffer.select(command);
        Ok(command)
    }

    /// Activates the first diagnostic under a 1-based cursor position.
    ///
    /// Returns `Ok(None)` and leaves the selection alone when no diagnostic
    /// covers the position.
    pub fn activate_at(
        &self,
        source_id: &SourceId,
        line: u32,
        column: u32,
    ) -> Result<Option<(usize, SelectionCommand)>, SessionError> {
        // Lookup and activation share one entry borrow so a concurrent
        // recompile cannot swap the set in between.
        let activated = self
            .registry
            .with_entry_mut(source_id, |r| -> Result<_, CoreError> {
                let set = r.diagnostics_mut();
                match set.index_at(line, column) {
                    Some(i) => Ok(Some((i, activate(set, i)?))),
                    None => Ok(None),
                }
            })
            .ok_or_else(|| SessionError::NoPriorResult(source_id.clone()))??;
        Ok(activated)
    }
}

fn activate(set: &mut DiagnosticSet, index: usize) -> Result<SelectionCommand, CoreError> {
    set.set_active(index)?;
    SelectionBridge::command_for(set).ok_or(CoreError::SelectionIndexOutOfRange {
        index,
        len: set.len(),
    })
}

fn build_diagnostics(messages: Vec<PipelineMessage>) -> Result<DiagnosticSet, CoreError> {
    messages
        .into_iter()
        .map(|m| -> Result<DiagnosticMessage, CoreError> {
            let range = SourceRange::new(m.start_line, m.start_column, m.end_line, m.end_column)?;
            Ok(DiagnosticMessage::new(m.severity, m.text, range))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineError, PipelineOutput};
    use scriptc_core::Severity;
    use std::sync::Mutex;

    /// Pipeline that replays queued outputs in order.
    #[derive(Default)]
    struct Scripted {
        outputs: Mutex<Vec<Result<PipelineOutput<String>, PipelineError>>>,
    }

    impl Scripted {
        fn then(self, output: Result<PipelineOutput<String>, PipelineError>) -> Self {
            self.outputs.lock().unwrap().insert(0, output);
            self
        }
    }

    impl CompilerPipeline for Scripted {
        type Artifact = String;

        fn compile(
            &self,
            _source_text: &str,
            _options: &CompileOptions,
        ) -> Result<PipelineOutput<String>, PipelineError> {
            self.outputs
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(PipelineError::new("no scripted output left")))
        }
    }

    fn msg(severity: Severity, text: &str, line: u32, column: u32) -> PipelineMessage {
        PipelineMessage::on_line(severity, text, line, column, 1)
    }

    fn id() -> SourceId {
        SourceId::new("buffer")
    }

    #[test]
    fn uncompiled_before_first_compile() {
        let session = CompilationSession::new(Scripted::default());
        assert!(!session.has_result(&id()));
        assert_eq!(session.status(&id()), Status::Uncompiled);
        assert!(session.counts(&id()).is_none());
    }

    #[test]
    fn failed_run_is_data_not_error() {
        let pipeline = Scripted::default().then(Ok(PipelineOutput::failed(vec![msg(
            Severity::Error,
            "unexpected end of expression",
            2,
            12,
        )])));
        let session = CompilationSession::new(pipeline);

        let result = session.compile(&id(), "let x = 1\nlet y = x +\n", &CompileOptions::default()).unwrap();
        assert_eq!(result.status(), Status::Failed);
        assert!(result.artifact().is_none());
        assert_eq!(session.counts(&id()), Some((1, 0)));
        assert!(session.has_result(&id()));
    }

    #[test]
    fn pipeline_error_leaves_registry_untouched() {
        let pipeline = Scripted::default()
            .then(Ok(PipelineOutput::success(vec![], "first".to_string())))
            .then(Err(PipelineError::new("crashed")));
        let session = CompilationSession::new(pipeline);

        session.compile(&id(), "a", &CompileOptions::default()).unwrap();
        let err = session.compile(&id(), "b", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, SessionError::Compile(_)));

        assert_eq!(session.status(&id()), Status::Success);
        assert_eq!(session.artifact(&id()).as_deref().map(String::as_str), Some("first"));
        assert_eq!(session.is_stale(&id(), "a"), Some(false));
    }

    #[test]
    fn malformed_range_aborts_without_mutation() {
        let bad = PipelineMessage {
            severity: Severity::Error,
            text: "bad".into(),
            start_line: 0,
            start_column: 1,
            end_line: 1,
            end_column: 2,
        };
        let session = CompilationSession::new(Scripted::default().then(Ok(PipelineOutput::failed(vec![bad]))));

        let err = session.compile(&id(), "x", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, SessionError::Core(CoreError::InvalidRange { .. })));
        assert!(!session.has_result(&id()));
    }

    #[test]
    fn success_without_artifact_is_rejected() {
        let output = PipelineOutput {
            status: PipelineStatus::Success,
            messages: vec![],
            artifact: None,
        };
        let session = CompilationSession::new(Scripted::default().then(Ok(output)));
        let err = session.compile(&id(), "x", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, SessionError::MissingArtifact(_)));
        assert!(!session.has_result(&id()));
    }

    #[test]
    fn failed_run_drops_artifact() {
        let output = PipelineOutput {
            status: PipelineStatus::Failed,
            messages: vec![msg(Severity::Error, "e", 1, 1)],
            artifact: Some("partial".to_string()),
        };
        let session = CompilationSession::new(Scripted::default().then(Ok(output)));
        session.compile(&id(), "x", &CompileOptions::default()).unwrap();
        assert!(session.artifact(&id()).is_none());
    }

    #[test]
    fn deny_warnings_turns_success_into_failure() {
        let pipeline = Scripted::default().then(Ok(PipelineOutput::success(
            vec![msg(Severity::Warning, "shadowed", 1, 5)],
            "artifact".to_string(),
        )));
        let session = CompilationSession::new(pipeline);
        let options = CompileOptions {
            deny_warnings: true,
            ..Default::default()
        };

        let result = session.compile(&id(), "x", &options).unwrap();
        assert_eq!(result.status(), Status::Failed);
        assert!(session.artifact(&id()).is_none());
        assert_eq!(session.counts(&id()), Some((0, 1)));
    }

    #[test]
    fn set_active_without_result_is_no_prior_result() {
        let session = CompilationSession::new(Scripted::default());
        let err = session.set_active(&id(), 0).unwrap_err();
        assert!(matches!(err, SessionError::NoPriorResult(_)));
    }

    #[test]
    fn set_active_maps_range_and_records_index() {
        let pipeline = Scripted::default().then(Ok(PipelineOutput::failed(vec![
            msg(Severity::Warning, "w", 1, 5),
            msg(Severity::Error, "e", 2, 12),
        ])));
        let session = CompilationSession::new(pipeline);
        session.compile(&id(), "src", &CompileOptions::default()).unwrap();

        let command = session.set_active(&id(), 1).unwrap();
        assert_eq!(
            command,
            SelectionCommand {
                line_start: 1,
                char_start: 11,
                line_end: 1,
                char_end: 12,
            }
        );
        let set = session.diagnostics(&id()).unwrap();
        assert_eq!(set.active_index(), Some(1));
    }

    #[test]
    fn set_active_out_of_range_keeps_previous_index() {
        let pipeline = Scripted::default().then(Ok(PipelineOutput::failed(vec![msg(
            Severity::Error,
            "e",
            1,
            1,
        )])));
        let session = CompilationSession::new(pipeline);
        session.compile(&id(), "src", &CompileOptions::default()).unwrap();
        session.set_active(&id(), 0).unwrap();

        let err = session.set_active(&id(), 3).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Core(CoreError::SelectionIndexOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(session.diagnostics(&id()).unwrap().active_index(), Some(0));
    }

    #[test]
    fn activate_at_follows_cursor() {
        let pipeline = Scripted::default().then(Ok(PipelineOutput::failed(vec![
            msg(Severity::Warning, "w", 1, 5),
            msg(Severity::Error, "e", 2, 12),
        ])));
        let session = CompilationSession::new(pipeline);
        session.compile(&id(), "src", &CompileOptions::default()).unwrap();

        let (index, _) = session.activate_at(&id(), 2, 12).unwrap().unwrap();
        assert_eq!(index, 1);
        assert!(session.activate_at(&id(), 3, 1).unwrap().is_none());
        assert_eq!(session.diagnostics(&id()).unwrap().active_index(), Some(1));
    }

    #[test]
    fn discard_forgets_source() {
        let session = CompilationSession::new(
            Scripted::default().then(Ok(PipelineOutput::success(vec![], String::new()))),
        );
        session.compile(&id(), "", &CompileOptions::default()).unwrap();
        assert!(session.discard(&id()));
        assert_eq!(session.status(&id()), Status::Uncompiled);
        assert!(!session.discard(&id()));
    }
}
