//! Syntax errors raised while lexing or parsing a line.

/// A single-line syntax error at a 1-based display column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{col}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub col: u32,
    pub width: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, col: u32, width: u32) -> Self {
        SyntaxError {
            message: message.into(),
            col,
            width,
        }
    }
}
