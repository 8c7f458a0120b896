//! Ordered diagnostic collection with derived counts and an active selection.
//!
//! [`DiagnosticSet`] keeps messages in the order the pipeline emitted them.
//! The error and warning counts are maintained on every push rather than
//! recomputed, so [`DiagnosticSet::counts`] is O(1). The active index is
//! `None` whenever the set is empty; when it is `Some(i)`, `i < len`.

use serde::Serialize;

use crate::diagnostic::{DiagnosticMessage, Severity};
use crate::error::CoreError;

/// The diagnostics produced by one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticSet {
    messages: Vec<DiagnosticMessage>,
    active: Option<usize>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from messages in emission order.
    pub fn from_messages(messages: impl IntoIterator<Item = DiagnosticMessage>) -> Self {
        messages.into_iter().collect()
    }

    /// Appends a message, keeping counts consistent.
    pub fn push(&mut self, message: DiagnosticMessage) {
        match message.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => {}
        }
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[DiagnosticMessage] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&DiagnosticMessage> {
        self.messages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticMessage> {
        self.messages.iter()
    }

    /// `(error_count, warning_count)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.error_count, self.warning_count)
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn info_count(&self) -> usize {
        self.messages.len() - self.error_count - self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// The currently selected message, if any.
    pub fn active(&self) -> Option<&DiagnosticMessage> {
        self.active.and_then(|i| self.messages.get(i))
    }

    /// Selects the message at `index`.
    ///
    /// On an empty set or an out-of-range index the active selection is left
    /// as it was and [`CoreError::SelectionIndexOutOfRange`] is returned.
    pub fn set_active(&mut self, index: usize) -> Result<&DiagnosticMessage, CoreError> {
        if index >= self.messages.len() {
            return Err(CoreError::SelectionIndexOutOfRange {
                index,
                len: self.messages.len(),
            });
        }
        self.active = Some(index);
        Ok(&self.messages[index])
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Index of the first message whose range contains a 1-based cursor
    /// position.
    pub fn index_at(&self, line: u32, column: u32) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.range.contains(line, column))
    }
}

impl FromIterator<DiagnosticMessage> for DiagnosticSet {
    fn from_iter<I: IntoIterator<Item = DiagnosticMessage>>(iter: I) -> Self {
        let mut set = DiagnosticSet::new();
        for message in iter {
            set.push(message);
        }
        set
    }
}

impl<'a> IntoIterator for &'a DiagnosticSet {
    type Item = &'a DiagnosticMessage;
    type IntoIter = std::slice::Iter<'a, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
