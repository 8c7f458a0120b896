//! Translation from the active diagnostic to an editor selection.
//!
//! Diagnostic ranges are 1-based; editor surfaces address text 0-based.
//! [`SelectionCommand::from_range`] is the single place where that boundary
//! is crossed: it subtracts 1 from the start and end position on both the
//! line and the character axis.

use serde::Serialize;

use scriptc_core::{DiagnosticSet, SourceRange};

/// A 0-based selection request for the editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SelectionCommand {
    pub line_start: u32,
    pub char_start: u32,
    pub line_end: u32,
    pub char_end: u32,
}

impl SelectionCommand {
    pub fn from_range(range: &SourceRange) -> Self {
        SelectionCommand {
            line_start: range.start_line.saturating_sub(1),
            char_start: range.start_column.saturating_sub(1),
            line_end: range.end_line.saturating_sub(1),
            char_end: range.end_column.saturating_sub(1),
        }
    }
}

/// The live editor buffer the diagnostic ranges refer to.
pub trait EditorBuffer {
    /// Current full text of the buffer.
    fn text(&self) -> String;

    /// Applies a selection to the buffer.
    fn select(&mut self, command: SelectionCommand);
}

/// In-memory [`EditorBuffer`] that remembers the last selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    selection: Option<SelectionCommand>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        TextBuffer {
            text: text.into(),
            selection: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn selection(&self) -> Option<SelectionCommand> {
        self.selection
    }

    /// The selected text, if the selection lies within the current text.
    ///
    /// A selection built from a stale range can point past the end of an
    /// edited buffer; that yields `None` rather than a clamped slice.
    pub fn selected_text(&self) -> Option<&str> {
        let sel = self.selection?;
        let start = self.offset_of(sel.line_start, sel.char_start)?;
        let end = self.offset_of(sel.line_end, sel.char_end)?;
        self.text.get(start..end)
    }

    /// Byte offset of a 0-based (line, char) position. The position just past
    /// the last character of a line is valid (it addresses the line break).
    fn offset_of(&self, line: u32, ch: u32) -> Option<usize> {
        let mut line_start = 0usize;
        for (i, line_text) in self.text.split('\n').enumerate() {
            if i == line as usize {
                let char_count = line_text.chars().count();
                let ch = ch as usize;
                if ch > char_count + 1 {
                    return None;
                }
                let within = line_text
                    .char_indices()
                    .nth(ch)
                    .map(|(b, _)| b)
                    .unwrap_or_else(|| line_text.len() + (ch - char_count));
                let offset = line_start + within;
                return (offset <= self.text.len()).then_some(offset);
            }
            line_start += line_text.len() + 1;
        }
        None
    }
}

impl EditorBuffer for TextBuffer {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn select(&mut self, command: SelectionCommand) {
        self.selection = Some(command);
    }
}

/// Notifies an editor buffer when the active diagnostic changes.
///
/// The bridge never compiles and never mutates the diagnostic set; it only
/// reads the active message and forwards its range.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionBridge;

impl SelectionBridge {
    /// The command for the active message, without dispatching it.
    pub fn command_for(set: &DiagnosticSet) -> Option<SelectionCommand> {
        set.active().map(|m| SelectionCommand::from_range(&m.range))
    }

    /// Dispatches the active message's selection to `buffer`.
    ///
    /// No-op returning `None` when the set is empty or nothing is active.
    pub fn on_active_changed<B: EditorBuffer + ?Sized>(
        set: &DiagnosticSet,
        buffer: &mut B,
    ) -> Option<SelectionCommand> {
        let command = Self::command_for(set)?;
        tracing::debug!(?command, "dispatching diagnostic selection");
        buffer.select(command);
        Some(command)
    }
}
