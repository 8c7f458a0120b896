//! Compilation sessions for editor buffers.
//!
//! A [`CompilationSession`] drives an external [`CompilerPipeline`] for one
//! source at a time, stores the latest [`CompilationResult`] per source in a
//! [`SourceRegistry`], and translates diagnostic selection into editor
//! selection commands through the [`SelectionBridge`].
//!
//! # Modules
//!
//! - [`pipeline`] -- the compiler contract and [`CompileOptions`]
//! - [`registry`] -- per-source result storage
//! - [`in_flight`] -- one-compile-per-source guard
//! - [`session`] -- the compile / status / selection surface
//! - [`selection`] -- diagnostic range to editor selection translation
//! - [`error`] -- [`SessionError`]
//!
//! [`CompilationResult`]: scriptc_core::CompilationResult

pub mod error;
pub mod in_flight;
pub mod pipeline;
pub mod registry;
pub mod selection;
pub mod session;

pub use error::SessionError;
pub use pipeline::{
    CompileOptions, CompilerPipeline, PipelineError, PipelineMessage, PipelineOutput,
    PipelineStatus,
};
pub use registry::SourceRegistry;
pub use selection::{EditorBuffer, SelectionBridge, SelectionCommand, TextBuffer};
pub use session::CompilationSession;
