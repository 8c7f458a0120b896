//! Per-line tokenizer.
//!
//! Tokens are recognized by a `logos` lexer over one source line. Byte spans
//! are then mapped to 1-based display columns, with tabs advancing to the
//! next multiple of the tab width.

use std::fmt;

use logos::Logos;

use crate::error::SyntaxError;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\f\r]+")]
pub enum TokenKind {
    #[token("let")]
    Let,

    #[token("print")]
    Print,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Kept as text so an oversized literal is reported by the parser.
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Int(String),

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("=")]
    Equals,

    #[regex(r"#[^\n]*")]
    Comment,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Let => write!(f, "'let'"),
            TokenKind::Print => write!(f, "'print'"),
            TokenKind::Ident(name) => write!(f, "'{name}'"),
            TokenKind::Int(digits) => write!(f, "'{digits}'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::Comment => write!(f, "comment"),
        }
    }
}

/// A token with its 1-based display column and width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub col: u32,
    pub width: u32,
}

/// The tokens of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedLine {
    pub tokens: Vec<Token>,
    /// Column just past the code on this line (a trailing comment excluded).
    pub end_col: u32,
    /// The code portion of the line, trimmed.
    pub code: String,
}

/// Maps byte offsets within a line to display columns.
struct Columns {
    by_byte: Vec<u32>,
}

impl Columns {
    fn new(line: &str, tab_width: u32) -> Self {
        let tab_width = tab_width.max(1);
        let mut by_byte = Vec::with_capacity(line.len() + 1);
        let mut col = 1u32;
        for ch in line.chars() {
            for _ in 0..ch.len_utf8() {
                by_byte.push(col);
            }
            col = if ch == '\t' {
                ((col - 1) / tab_width + 1) * tab_width + 1
            } else {
                col.saturating_add(1)
            };
        }
        by_byte.push(col);
        Columns { by_byte }
    }

    fn at(&self, byte: usize) -> u32 {
        self.by_byte
            .get(byte)
            .or_else(|| self.by_byte.last())
            .copied()
            .unwrap_or(1)
    }
}

/// Tokenizes a single line. Every unrecognized character is reported; the
/// line yields no tokens if any were found.
pub fn lex_line(line: &str, tab_width: u32) -> Result<LexedLine, Vec<SyntaxError>> {
    let columns = Columns::new(line, tab_width);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut code_end = line.len();

    let mut lexer = TokenKind::lexer(line);
    while let Some(next) = lexer.next() {
        let span = lexer.span();
        let col = columns.at(span.start);
        let width = columns.at(span.end).saturating_sub(col).max(1);
        match next {
            Ok(TokenKind::Comment) => {
                code_end = span.start;
                break;
            }
            Ok(kind) => tokens.push(Token { kind, col, width }),
            Err(()) => {
                let ch = lexer.slice().chars().next().unwrap_or('?');
                errors.push(SyntaxError::new(
                    format!("unexpected character '{ch}'"),
                    col,
                    1,
                ));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(LexedLine {
        tokens,
        end_col: columns.at(code_end),
        code: line[..code_end].trim().to_string(),
    })
}
