//! The compiled artifact: an ordered list of checked statements.

use std::fmt;

/// Column span on a statement's line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub col: u32,
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int { value: i64, span: Span },
    Name { name: String, span: Span },
    Neg(Box<Expr>),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
}

impl Expr {
    /// Names read by this expression, left to right, with repeats.
    pub fn names(&self) -> Vec<(&str, Span)> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<(&'a str, Span)>) {
        match self {
            Expr::Int { .. } => {}
            Expr::Name { name, span } => out.push((name, *span)),
            Expr::Neg(inner) => inner.collect_names(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_names(out);
                rhs.collect_names(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Let { name: String, name_span: Span, value: Expr },
    Print { value: Expr },
}

/// One statement and the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: u32,
    /// Statement source text without comments or surrounding whitespace.
    pub text: String,
    pub kind: StatementKind,
}

impl Statement {
    pub fn value(&self) -> &Expr {
        match &self.kind {
            StatementKind::Let { value, .. } | StatementKind::Print { value } => value,
        }
    }

    /// The name this statement binds, if it is a `let`.
    pub fn binds(&self) -> Option<&str> {
        match &self.kind {
            StatementKind::Let { name, .. } => Some(name),
            StatementKind::Print { .. } => None,
        }
    }
}

/// A script that parsed and resolved without errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
