//! Diagnostics data model for script compilation sessions.
//!
//! Everything in this crate is plain data: source identities, source ranges,
//! diagnostic messages, the ordered [`DiagnosticSet`] with its derived counts
//! and active selection, and the [`CompilationResult`] a session stores per
//! source. Compilation itself lives in `scriptc-session`.

pub mod diagnostic;
pub mod error;
pub mod id;
pub mod range;
pub mod result;
pub mod set;

// Re-export commonly used types
pub use diagnostic::{DiagnosticMessage, Severity};
pub use error::CoreError;
pub use id::SourceId;
pub use range::SourceRange;
pub use result::{CompilationResult, SourceHash, Status};
pub use set::DiagnosticSet;
