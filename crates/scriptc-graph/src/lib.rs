//! Structural graph export for compiled scripts.
//!
//! A [`GraphProducer`] turns a compiled artifact into a [`GraphDescription`]
//! (a petgraph `StableGraph` with string node ids and ordered attributes).
//! The [`GraphExporter`] serializes that description as line-oriented DOT
//! text next to the caller's chosen path, atomically, and can hand the file
//! to an external [`Renderer`] (Graphviz `dot` by default) to produce an
//! image.
//!
//! # Modules
//!
//! - [`description`] -- graph model and the producer contract
//! - [`dot`] -- DOT writer and the matching reader
//! - [`export`] -- export / export-and-render against a session
//! - [`render`] -- renderer subprocess invocation
//! - [`error`] -- [`GraphError`], [`ExportError`], [`RenderError`]

pub mod description;
pub mod dot;
pub mod error;
pub mod export;
pub mod render;

pub use description::{GraphDescription, GraphEdge, GraphNode, GraphProducer};
pub use dot::{parse_dot, to_dot};
pub use error::{ExportError, GraphError, RenderError};
pub use export::GraphExporter;
pub use render::Renderer;
