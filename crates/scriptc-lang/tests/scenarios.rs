//! End-to-end behavior of a session driving the script pipeline.

use scriptc_core::{Severity, SourceId, Status};
use scriptc_graph::{parse_dot, ExportError, GraphExporter};
use scriptc_lang::{ScriptGraph, ScriptPipeline};
use scriptc_session::{
    CompilationSession, CompileOptions, EditorBuffer, SelectionCommand, SessionError, TextBuffer,
};

const BROKEN: &str = "let x = 1\nlet y = x +\n";
const VALID: &str = "let x = 1\nlet y = x + 2\nprint y\n";

fn session() -> CompilationSession<ScriptPipeline> {
    CompilationSession::new(ScriptPipeline)
}

#[test]
fn incomplete_expression_fails_with_one_error() {
    let session = session();
    let id = SourceId::new("broken.sc");
    let result = session
        .compile(&id, BROKEN, &CompileOptions::default())
        .unwrap();

    assert_eq!(result.status(), Status::Failed);
    assert!(result.artifact().is_none());
    let set = result.diagnostics();
    assert_eq!(set.len(), 1);
    let msg = &set.messages()[0];
    assert_eq!(msg.severity, Severity::Error);
    assert_eq!(msg.text, "unexpected end of expression");
    assert_eq!(msg.range.start(), (2, 12));
    assert_eq!(msg.range.end(), (2, 13));
    assert_eq!(session.counts(&id), Some((1, 0)));
    assert_eq!(session.status(&id), Status::Failed);
}

#[test]
fn activating_the_error_selects_the_line_break() {
    let session = session();
    let id = SourceId::new("broken.sc");
    session
        .compile(&id, BROKEN, &CompileOptions::default())
        .unwrap();

    let command = session.set_active(&id, 0).unwrap();
    assert_eq!(
        command,
        SelectionCommand {
            line_start: 1,
            char_start: 11,
            line_end: 1,
            char_end: 12,
        }
    );

    let mut buffer = TextBuffer::new(BROKEN);
    session.select_diagnostic(&id, 0, &mut buffer).unwrap();
    assert_eq!(buffer.selection(), Some(command));
    assert_eq!(buffer.selected_text(), Some("\n"));
    assert_eq!(buffer.text(), BROKEN);
}

#[test]
fn out_of_range_activation_leaves_the_index_alone() {
    let session = session();
    let id = SourceId::new("broken.sc");
    session
        .compile(&id, BROKEN, &CompileOptions::default())
        .unwrap();
    session.set_active(&id, 0).unwrap();

    let err = session.set_active(&id, 1).unwrap_err();
    assert!(matches!(err, SessionError::Core(_)));
    assert_eq!(session.diagnostics(&id).unwrap().active_index(), Some(0));
}

#[test]
fn valid_source_succeeds_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let session = session();
    let id = SourceId::new("valid.sc");
    let result = session
        .compile(&id, VALID, &CompileOptions::default())
        .unwrap();
    assert_eq!(result.status(), Status::Success);
    assert!(result.diagnostics().is_empty());

    let out = dir.path().join("valid.dot");
    GraphExporter::new(ScriptGraph::named("valid.sc"))
        .export_graph(&session, &id, &out)
        .unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(!text.is_empty());
    let graph = parse_dot(&text).unwrap();
    assert_eq!(graph.name(), "valid.sc");
    assert_eq!(graph.node_count(), 3);
    // Two control edges plus data edges x: s1 -> s2 and y: s2 -> s3.
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.node("s2").unwrap().attrs["label"], "let y = x + 2");
}

#[test]
fn export_before_compile_reports_no_prior_result() {
    let dir = tempfile::tempdir().unwrap();
    let session = session();
    let out = dir.path().join("never.dot");
    let err = GraphExporter::new(ScriptGraph::new())
        .export_graph(&session, &SourceId::new("never.sc"), &out)
        .unwrap_err();
    assert!(matches!(err, ExportError::NoPriorResult(_)));
    assert!(!out.exists());
}

#[test]
fn recompiling_replaces_the_previous_result() {
    let session = session();
    let id = SourceId::new("doc.sc");
    session
        .compile(&id, BROKEN, &CompileOptions::default())
        .unwrap();
    session.set_active(&id, 0).unwrap();

    session
        .compile(&id, VALID, &CompileOptions::default())
        .unwrap();
    assert_eq!(session.status(&id), Status::Success);
    assert_eq!(session.counts(&id), Some((0, 0)));
    assert!(session.set_active(&id, 0).is_err());
    assert_eq!(session.is_stale(&id, BROKEN), Some(true));
    assert_eq!(session.is_stale(&id, VALID), Some(false));
}

#[test]
fn deny_warnings_turns_warnings_into_failure() {
    let session = session();
    let id = SourceId::new("warn.sc");
    let src = "let a = 1\nlet a = a / 0\nprint a\n";

    let lenient = session
        .compile(&id, src, &CompileOptions::default())
        .unwrap();
    assert_eq!(lenient.status(), Status::Success);
    assert_eq!(lenient.diagnostics().counts(), (0, 2));

    let strict = CompileOptions {
        deny_warnings: true,
        ..CompileOptions::default()
    };
    let denied = session.compile(&id, src, &strict).unwrap();
    assert_eq!(denied.status(), Status::Failed);
    assert!(session.artifact(&id).is_none());
}

#[test]
fn cursor_activation_finds_the_covering_diagnostic() {
    let session = session();
    let id = SourceId::new("names.sc");
    session
        .compile(&id, "let a = 1\nprint a + nope\n", &CompileOptions::default())
        .unwrap();

    let (index, command) = session.activate_at(&id, 2, 12).unwrap().unwrap();
    assert_eq!(index, 0);
    assert_eq!((command.line_start, command.char_start), (1, 10));
    assert_eq!(session.activate_at(&id, 1, 1).unwrap(), None);
}

#[test]
fn pathological_nesting_is_reported_not_fatal() {
    let session = session();
    let id = SourceId::new("deep.sc");
    let src = format!("let a = 1\nprint {}1\nprint b\n", "(".repeat(200_000));
    let result = session
        .compile(&id, &src, &CompileOptions::default())
        .unwrap();

    assert_eq!(result.status(), Status::Failed);
    let set = result.diagnostics();
    assert_eq!(set.len(), 1);
    let msg = &set.messages()[0];
    assert_eq!(msg.text, "expression nested too deeply");
    assert_eq!(msg.range.start(), (2, 263));
}
