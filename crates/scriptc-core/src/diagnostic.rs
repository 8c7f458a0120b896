//! Diagnostic messages reported by a compiler pipeline.

use std::fmt;

use serde::Serialize;

use crate::range::SourceRange;

/// Severity of a compiler-reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(label)
    }
}

/// One compiler-reported issue, anchored to a range of the compiled text.
///
/// Messages have no identity beyond their content: two compiles of the same
/// text produce equal, but distinct, instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiagnosticMessage {
    pub severity: Severity,
    pub text: String,
    pub range: SourceRange,
}

impl DiagnosticMessage {
    pub fn new(severity: Severity, text: impl Into<String>, range: SourceRange) -> Self {
        DiagnosticMessage {
            severity,
            text: text.into(),
            range,
        }
    }

    pub fn error(text: impl Into<String>, range: SourceRange) -> Self {
        Self::new(Severity::Error, text, range)
    }

    pub fn warning(text: impl Into<String>, range: SourceRange) -> Self {
        Self::new(Severity::Warning, text, range)
    }

    pub fn info(text: impl Into<String>, range: SourceRange) -> Self {
        Self::new(Severity::Info, text, range)
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.range.start_line, self.range.start_column, self.severity, self.text
        )
    }
}
