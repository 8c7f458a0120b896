//! Name resolution and lint warnings over a parsed script.

use std::collections::HashSet;

use scriptc_core::Severity;
use scriptc_session::PipelineMessage;

use crate::program::{BinOp, Expr, Span, Statement, StatementKind};

fn message(severity: Severity, text: String, line: u32, span: Span) -> PipelineMessage {
    PipelineMessage::on_line(severity, text, line, span.col, span.width)
}

/// Checks statements in source order. A `let` binds its name only after
/// its own value has been checked, so `let x = x` reads an earlier `x`.
pub fn check(statements: &[Statement]) -> Vec<PipelineMessage> {
    let mut bound: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for stmt in statements {
        if let StatementKind::Let {
            name, name_span, ..
        } = &stmt.kind
        {
            if bound.contains(name.as_str()) {
                out.push(message(
                    Severity::Warning,
                    format!("'{name}' shadows an earlier binding"),
                    stmt.line,
                    *name_span,
                ));
            }
        }

        check_expr(stmt.value(), stmt.line, &bound, &mut out);

        if let Some(name) = stmt.binds() {
            bound.insert(name);
        }
    }
    out
}

fn check_expr(expr: &Expr, line: u32, bound: &HashSet<&str>, out: &mut Vec<PipelineMessage>) {
    match expr {
        Expr::Int { .. } => {}
        Expr::Name { name, span } => {
            if !bound.contains(name.as_str()) {
                out.push(message(
                    Severity::Error,
                    format!("undefined name '{name}'"),
                    line,
                    *span,
                ));
            }
        }
        Expr::Neg(inner) => check_expr(inner, line, bound, out),
        Expr::Binary { op, lhs, rhs } => {
            check_expr(lhs, line, bound, out);
            check_expr(rhs, line, bound, out);
            if let (BinOp::Div, Expr::Int { value: 0, span }) = (op, rhs.as_ref()) {
                out.push(message(
                    Severity::Warning,
                    "division by literal zero".to_string(),
                    line,
                    *span,
                ));
            }
        }
    }
}
