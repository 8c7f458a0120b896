//! Core error types for scriptc-core.
//!
//! Uses `thiserror` for structured, matchable variants. Both variants are
//! caller or collaborator mistakes; a failed compilation is never an error
//! here, it is data stored in a [`DiagnosticSet`](crate::DiagnosticSet).

use thiserror::Error;

/// Errors produced by the diagnostics data model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A source range had a zero coordinate or ended before it started.
    #[error(
        "invalid source range {start_line}:{start_column}-{end_line}:{end_column}: {reason}"
    )]
    InvalidRange {
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
        reason: &'static str,
    },

    /// `set_active` was called with an index outside `[0, len)`.
    #[error("selection index {index} out of range for {len} diagnostic(s)")]
    SelectionIndexOutOfRange { index: usize, len: usize },
}
