//! A small line-oriented script language with a compiler pipeline and a
//! statement graph producer.
//!
//! ```text
//! # comments run to end of line
//! let width = 8
//! let area = width * (width - 2)
//! print area / 2
//! ```
//!
//! [`ScriptPipeline`] plugs into a `scriptc_session::CompilationSession`;
//! [`ScriptGraph`] plugs into a `scriptc_graph::GraphExporter`.

pub mod checker;
pub mod error;
pub mod graph;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod program;

pub use error::SyntaxError;
pub use graph::ScriptGraph;
pub use pipeline::ScriptPipeline;
pub use program::{BinOp, Expr, Program, Span, Statement, StatementKind};
