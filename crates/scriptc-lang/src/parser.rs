//! Recursive-descent parser for one statement per line.
//!
//! ```text
//! statement := 'let' NAME '=' expr | 'print' expr
//! expr      := term (('+' | '-') term)*
//! term      := unary (('*' | '/') unary)*
//! unary     := '-' unary | primary
//! primary   := INT | NAME | '(' expr ')'
//! ```
//!
//! Parsing stops at the first error on a line. Expressions deeper than
//! [`MAX_NESTING`] levels are rejected so later passes can recurse freely.

use crate::error::SyntaxError;
use crate::lexer::{LexedLine, Token, TokenKind};
use crate::program::{BinOp, Expr, Span, Statement, StatementKind};

/// Deepest expression tree (and parenthesis or unary nesting) accepted.
pub const MAX_NESTING: u32 = 256;

const TOO_DEEP: &str = "expression nested too deeply";

/// A parsed subexpression with its tree height.
type Sub = (Expr, u32);

struct LineParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end_col: u32,
    depth: u32,
}

impl<'a> LineParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == *kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Error anchored at the current token, or at end of line.
    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        match self.peek() {
            Some(t) => SyntaxError::new(message, t.col, t.width),
            None => SyntaxError::new(message, self.end_col, 1),
        }
    }

    fn statement(&mut self) -> Result<StatementKind, SyntaxError> {
        let Some(first) = self.bump() else {
            return Err(self.error_here("expected 'let' or 'print'"));
        };
        let kind = match &first.kind {
            TokenKind::Let => {
                let (name, name_span) = match self.peek() {
                    Some(Token {
                        kind: TokenKind::Ident(name),
                        col,
                        width,
                    }) => {
                        self.pos += 1;
                        (
                            name.clone(),
                            Span {
                                col: *col,
                                width: *width,
                            },
                        )
                    }
                    _ => return Err(self.error_here("expected binding name after 'let'")),
                };
                if !self.eat(&TokenKind::Equals) {
                    return Err(self.error_here("expected '=' after binding name"));
                }
                let value = self.expr()?;
                StatementKind::Let {
                    name,
                    name_span,
                    value,
                }
            }
            TokenKind::Print => StatementKind::Print { value: self.expr()? },
            other => {
                return Err(SyntaxError::new(
                    format!("expected 'let' or 'print', found {other}"),
                    first.col,
                    first.width,
                ))
            }
        };
        if let Some(extra) = self.peek() {
            return Err(SyntaxError::new(
                format!("unexpected {} after expression", extra.kind),
                extra.col,
                extra.width,
            ));
        }
        Ok(kind)
    }

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        self.sum().map(|(expr, _)| expr)
    }

    /// Enters one level of parenthesis or unary nesting.
    fn nest(&mut self, at: &Token) -> Result<(), SyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::new(TOO_DEEP, at.col, at.width));
        }
        self.depth += 1;
        Ok(())
    }

    fn binary(op: BinOp, at: &Token, lhs: Sub, rhs: Sub) -> Result<Sub, SyntaxError> {
        let height = lhs.1.max(rhs.1) + 1;
        if height > MAX_NESTING {
            return Err(SyntaxError::new(TOO_DEEP, at.col, at.width));
        }
        let expr = Expr::Binary {
            op,
            lhs: Box::new(lhs.0),
            rhs: Box::new(rhs.0),
        };
        Ok((expr, height))
    }

    fn sum(&mut self) -> Result<Sub, SyntaxError> {
        let mut lhs = self.term()?;
        loop {
            let Some(at) = self.peek() else {
                return Ok(lhs);
            };
            let op = match at.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Self::binary(op, at, lhs, rhs)?;
        }
    }

    fn term(&mut self) -> Result<Sub, SyntaxError> {
        let mut lhs = self.unary()?;
        loop {
            let Some(at) = self.peek() else {
                return Ok(lhs);
            };
            let op = match at.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Self::binary(op, at, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Sub, SyntaxError> {
        match self.peek() {
            Some(at) if at.kind == TokenKind::Minus => {
                self.pos += 1;
                self.nest(at)?;
                let operand = self.unary();
                self.depth -= 1;
                let (inner, height) = operand?;
                if height >= MAX_NESTING {
                    return Err(SyntaxError::new(TOO_DEEP, at.col, at.width));
                }
                Ok((Expr::Neg(Box::new(inner)), height + 1))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Sub, SyntaxError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here("unexpected end of expression"));
        };
        let span = Span {
            col: token.col,
            width: token.width,
        };
        match &token.kind {
            TokenKind::Int(digits) => {
                self.pos += 1;
                let value = digits.parse::<i64>().map_err(|_| {
                    SyntaxError::new("integer literal out of range", span.col, span.width)
                })?;
                Ok((Expr::Int { value, span }, 1))
            }
            TokenKind::Ident(name) => {
                self.pos += 1;
                let name = name.clone();
                Ok((Expr::Name { name, span }, 1))
            }
            TokenKind::LParen => {
                self.pos += 1;
                self.nest(token)?;
                let inner = self.sum();
                self.depth -= 1;
                let inner = inner?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(self.error_here("expected ')'"));
                }
                Ok(inner)
            }
            other => Err(SyntaxError::new(
                format!("expected expression, found {other}"),
                span.col,
                span.width,
            )),
        }
    }
}

/// Parses a lexed line. Blank and comment-only lines yield `Ok(None)`.
pub fn parse_line(lexed: &LexedLine, line: u32) -> Result<Option<Statement>, SyntaxError> {
    if lexed.tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = LineParser {
        tokens: &lexed.tokens,
        pos: 0,
        end_col: lexed.end_col,
        depth: 0,
    };
    let kind = parser.statement()?;
    Ok(Some(Statement {
        line,
        text: lexed.code.clone(),
        kind,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex_line;

    fn parse(src: &str) -> Result<Option<Statement>, SyntaxError> {
        parse_line(&lex_line(src, 4).unwrap(), 1)
    }

    fn err(src: &str) -> (String, u32, u32) {
        let e = parse(src).unwrap_err();
        (e.message, e.col, e.width)
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   # just a note").unwrap(), None);
    }

    #[test]
    fn precedence_binds_multiplication_tighter() {
        let stmt = parse("print 1 + 2 * -x").unwrap().unwrap();
        let StatementKind::Print { value } = stmt.kind else {
            panic!("expected print");
        };
        match value {
            Expr::Binary {
                op: BinOp::Add,
                rhs,
                ..
            } => assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. })),
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn statement_text_drops_the_comment() {
        let stmt = parse("  let total = (a + b) / 2  # average").unwrap().unwrap();
        assert_eq!(stmt.text, "let total = (a + b) / 2");
        assert_eq!(stmt.binds(), Some("total"));
        let names: Vec<&str> = stmt.value().names().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn syntax_errors_are_anchored() {
        assert_eq!(err("let y = x +"), ("unexpected end of expression".into(), 12, 1));
        assert_eq!(err("print )"), ("expected expression, found ')'".into(), 7, 1));
        assert_eq!(err("let = 1"), ("expected binding name after 'let'".into(), 5, 1));
        assert_eq!(err("let print = 1"), ("expected binding name after 'let'".into(), 5, 5));
        assert_eq!(err("let x 1"), ("expected '=' after binding name".into(), 7, 1));
        assert_eq!(err("print (1 + 2"), ("expected ')'".into(), 13, 1));
        assert_eq!(err("print 1 2"), ("unexpected '2' after expression".into(), 9, 1));
        assert_eq!(err("x = 1"), ("expected 'let' or 'print', found 'x'".into(), 1, 1));
        assert_eq!(
            err("print 99999999999999999999"),
            ("integer literal out of range".into(), 7, 20)
        );
    }

    fn nested(open: &str, depth: usize, close: &str) -> String {
        format!("print {}1{}", open.repeat(depth), close.repeat(depth))
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        assert!(parse(&nested("(", 256, ")")).unwrap().is_some());
        // Each '-' adds a level above the literal.
        assert!(parse(&nested("-", 255, "")).unwrap().is_some());
        let chain = format!("print 1{}", "+1".repeat(255));
        assert!(parse(&chain).unwrap().is_some());
    }

    #[test]
    fn nesting_past_the_limit_is_a_syntax_error() {
        // "print " occupies columns 1..=6, so the 257th opener sits at 263.
        let too_deep = ("expression nested too deeply".to_string(), 263, 1);
        assert_eq!(err(&nested("(", 257, ")")), too_deep);
        assert_eq!(err(&nested("-", 300, "")), too_deep);
        // The 256th '+' would make the tree 257 levels high.
        let chain = format!("print 1{}", "+1".repeat(300));
        assert_eq!(err(&chain), ("expression nested too deeply".into(), 518, 1));
    }
}
