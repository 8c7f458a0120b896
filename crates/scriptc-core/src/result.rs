//! Per-source compilation outcome.
//!
//! A [`CompilationResult`] bundles the status, the diagnostics and, on
//! success only, the compiled artifact. It also records a blake3 hash of the
//! exact text that was compiled so callers can tell whether the buffer has
//! changed since (the diagnostic ranges refer to that text, not to the live
//! buffer).

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::set::DiagnosticSet;

/// Outcome of the most recent compile of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No compile has been recorded for the source.
    Uncompiled,
    Success,
    /// The pipeline ran but rejected the source; see the diagnostics.
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Uncompiled => "uncompiled",
            Status::Success => "success",
            Status::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// blake3 hash of compiled source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHash(blake3::Hash);

impl SourceHash {
    pub fn of(text: &str) -> Self {
        SourceHash(blake3::hash(text.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for SourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for SourceHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.to_hex().as_str())
    }
}

/// The stored result of one compile call for one source.
///
/// The artifact is present exactly when `status` is [`Status::Success`] and
/// is shared behind an `Arc`, so cloning a result is cheap.
#[derive(Debug, Serialize)]
pub struct CompilationResult<A> {
    status: Status,
    diagnostics: DiagnosticSet,
    #[serde(skip)]
    artifact: Option<Arc<A>>,
    source_hash: SourceHash,
}

impl<A> CompilationResult<A> {
    pub fn success(diagnostics: DiagnosticSet, artifact: A, source_hash: SourceHash) -> Self {
        CompilationResult {
            status: Status::Success,
            diagnostics,
            artifact: Some(Arc::new(artifact)),
            source_hash,
        }
    }

    pub fn failed(diagnostics: DiagnosticSet, source_hash: SourceHash) -> Self {
        CompilationResult {
            status: Status::Failed,
            diagnostics,
            artifact: None,
            source_hash,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn diagnostics(&self) -> &DiagnosticSet {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticSet {
        &mut self.diagnostics
    }

    pub fn artifact(&self) -> Option<&Arc<A>> {
        self.artifact.as_ref()
    }

    pub fn source_hash(&self) -> SourceHash {
        self.source_hash
    }

    /// Whether `current_text` differs from the text this result was built from.
    pub fn is_stale(&self, current_text: &str) -> bool {
        SourceHash::of(current_text) != self.source_hash
    }
}

// Manual impl: `#[derive(Clone)]` would require `A: Clone`.
impl<A> Clone for CompilationResult<A> {
    fn clone(&self) -> Self {
        CompilationResult {
            status: self.status,
            diagnostics: self.diagnostics.clone(),
            artifact: self.artifact.clone(),
            source_hash: self.source_hash,
        }
    }
}
