//! Line-oriented DOT writer and the matching reader.
//!
//! The written form is one statement per line:
//!
//! ```text
//! digraph "name" {
//!   "a" [shape="box", label="let x = 1"];
//!   "b";
//!   "a" -> "b" [kind="data", label="x"];
//! }
//! ```
//!
//! Every id and attribute value is quoted. Attribute keys are written bare
//! when they are plain identifiers and quoted otherwise. Inside quotes, `"` and `\` are
//! backslash-escaped and a line break is written as `\n`, so each statement
//! stays on one line. [`parse_dot`] accepts exactly this subset (plus bare
//! identifiers and `//` comment lines) and rejects everything else with the
//! 1-based line number of the offending statement.

use crate::description::{Attrs, GraphDescription};
use crate::error::GraphError;

/// Serializes `graph` as DOT text. Nodes come first, then edges, each in
/// declaration order.
pub fn to_dot(graph: &GraphDescription) -> String {
    let mut out = format!("digraph {} {{\n", quote(graph.name()));
    for node in graph.nodes() {
        out.push_str("  ");
        out.push_str(&quote(&node.id));
        push_attrs(&mut out, &node.attrs);
        out.push_str(";\n");
    }
    for (from, to, edge) in graph.edges() {
        out.push_str("  ");
        out.push_str(&quote(from));
        out.push_str(" -> ");
        out.push_str(&quote(to));
        push_attrs(&mut out, &edge.attrs);
        out.push_str(";\n");
    }
    out.push_str("}\n");
    out
}

fn push_attrs(out: &mut String, attrs: &Attrs) {
    if attrs.is_empty() {
        return;
    }
    out.push_str(" [");
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if is_plain_key(key) {
            out.push_str(key);
        } else {
            out.push_str(&quote(key));
        }
        out.push('=');
        out.push_str(&quote(value));
    }
    out.push(']');
}

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding DOT keywords.
fn is_plain_key(key: &str) -> bool {
    const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];
    let mut chars = key.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Id(String),
    Arrow,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    Comma,
    Semi,
}

fn parse_err(line: usize, reason: impl Into<String>) -> GraphError {
    GraphError::Parse {
        line,
        reason: reason.into(),
    }
}

fn is_bare_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn tokenize(text: &str, line: usize) -> Result<Vec<Token>, GraphError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '{' => tokens.push(Token::LBrace),
            '}' => tokens.push(Token::RBrace),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            '=' => tokens.push(Token::Equals),
            ',' => tokens.push(Token::Comma),
            ';' => tokens.push(Token::Semi),
            '-' if chars.peek() == Some(&'>') => {
                chars.next();
                tokens.push(Token::Arrow);
            }
            '"' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('"') => value.push('"'),
                            Some('\\') => value.push('\\'),
                            Some('n') => value.push('\n'),
                            // Other escapes (\l, \r ...) are renderer directives; keep them.
                            Some(other) => {
                                value.push('\\');
                                value.push(other);
                            }
                            None => break,
                        },
                        c => value.push(c),
                    }
                }
                if !closed {
                    return Err(parse_err(line, "unterminated quoted string"));
                }
                tokens.push(Token::Id(value));
            }
            c if is_bare_id_char(c) || c == '-' => {
                let mut value = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_bare_id_char(next) {
                        break;
                    }
                    value.push(next);
                    chars.next();
                }
                if value == "-" {
                    return Err(parse_err(line, "unexpected '-'"));
                }
                tokens.push(Token::Id(value));
            }
            other => return Err(parse_err(line, format!("unexpected character '{other}'"))),
        }
    }
    Ok(tokens)
}

/// Parses DOT text in the subset written by [`to_dot`].
pub fn parse_dot(text: &str) -> Result<GraphDescription, GraphError> {
    let mut graph: Option<GraphDescription> = None;
    let mut closed = false;
    let mut last_line = 1;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        last_line = line;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if closed {
            return Err(parse_err(line, "content after closing '}'"));
        }
        let tokens = tokenize(trimmed, line)?;
        match graph.as_mut() {
            None => graph = Some(parse_header(&tokens, line)?),
            Some(_) if tokens == [Token::RBrace] => closed = true,
            Some(g) => parse_statement(g, &tokens, line)?,
        }
    }

    match graph {
        None => Err(parse_err(last_line, "missing 'digraph' header")),
        Some(_) if !closed => Err(parse_err(last_line, "missing closing '}'")),
        Some(g) => Ok(g),
    }
}

fn parse_header(tokens: &[Token], line: usize) -> Result<GraphDescription, GraphError> {
    match tokens {
        [Token::Id(kw), Token::Id(name), Token::LBrace] if kw == "digraph" => {
            Ok(GraphDescription::new(name.clone()))
        }
        [Token::Id(kw), Token::LBrace] if kw == "digraph" => Ok(GraphDescription::new("")),
        _ => Err(parse_err(line, "expected 'digraph <name> {'")),
    }
}

fn parse_statement(
    graph: &mut GraphDescription,
    tokens: &[Token],
    line: usize,
) -> Result<(), GraphError> {
    let tokens = match tokens {
        [body @ .., Token::Semi] => body,
        _ => tokens,
    };
    let at_line = |e: GraphError| parse_err(line, e.to_string());

    match tokens {
        [Token::Id(from), Token::Arrow, Token::Id(to), rest @ ..] => {
            let attrs = parse_attrs(rest, line)?;
            graph.add_edge(from, to, attrs).map_err(at_line)?;
        }
        [Token::Id(id), rest @ ..] => {
            let attrs = parse_attrs(rest, line)?;
            graph.add_node(id.clone(), attrs).map_err(at_line)?;
        }
        _ => return Err(parse_err(line, "expected a node or edge statement")),
    }
    Ok(())
}

fn parse_attrs(tokens: &[Token], line: usize) -> Result<Attrs, GraphError> {
    let mut attrs = Attrs::new();
    let inner = match tokens {
        [] => return Ok(attrs),
        [Token::LBracket, inner @ .., Token::RBracket] => inner,
        _ => return Err(parse_err(line, "expected '[' attribute list or end of statement")),
    };

    let mut rest = inner;
    while !rest.is_empty() {
        match rest {
            [Token::Id(key), Token::Equals, Token::Id(value), tail @ ..] => {
                attrs.insert(key.clone(), value.clone());
                rest = match tail {
                    [Token::Comma | Token::Semi, after @ ..] => after,
                    [] => tail,
                    _ => return Err(parse_err(line, "expected ',' between attributes")),
                };
            }
            _ => return Err(parse_err(line, "expected 'key=value' attribute")),
        }
    }
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn sample() -> GraphDescription {
        let mut g = GraphDescription::new("demo.sc");
        g.add_node("s1", [("shape", "box"), ("label", "let x = \"a\\b\"")])
            .unwrap();
        g.add_node("s2", [("shape", "ellipse"), ("label", "print x\n")])
            .unwrap();
        g.add_edge("s1", "s2", [("kind", "data"), ("label", "x")])
            .unwrap();
        g.add_edge("s1", "s2", [("kind", "control"), ("style", "dashed")])
            .unwrap();
        g
    }

    #[test]
    fn writes_header_nodes_edges_footer() {
        let dot = to_dot(&sample());
        let lines: Vec<&str> = dot.lines().collect();
        assert_eq!(lines[0], "digraph \"demo.sc\" {");
        assert_eq!(
            lines[1],
            r#"  "s1" [shape="box", label="let x = \"a\\b\""];"#
        );
        assert_eq!(lines[2], r#"  "s2" [shape="ellipse", label="print x\n"];"#);
        assert_eq!(lines[3], r#"  "s1" -> "s2" [kind="data", label="x"];"#);
        assert_eq!(lines[5], "}");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn quotes_keys_that_are_not_plain_identifiers() {
        let mut g = GraphDescription::new("g");
        g.add_node(
            "n",
            [("font size", "12"), ("node", "x"), ("_x1", "y"), ("9lives", "z")],
        )
        .unwrap();
        let dot = to_dot(&g);
        assert_eq!(
            dot.lines().nth(1),
            Some(r#"  "n" ["font size"="12", "node"="x", _x1="y", "9lives"="z"];"#)
        );
        assert!(parse_dot(&dot).unwrap().same_structure(&g));
    }

    #[test]
    fn reads_back_what_it_writes() {
        let original = sample();
        let parsed = parse_dot(&to_dot(&original)).unwrap();
        assert_eq!(parsed.name(), "demo.sc");
        assert!(parsed.same_structure(&original));
    }

    #[test]
    fn accepts_bare_ids_and_comments() {
        let text = "// generated\ndigraph g {\n  a [shape=box];\n  b\n  a -> b [weight=-1.5]\n}\n";
        let g = parse_dot(text).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.node("a").unwrap().attrs["shape"], "box");
        let (_, _, edge) = g.edges().next().unwrap();
        assert_eq!(edge.attrs["weight"], "-1.5");
    }

    #[test]
    fn parse_errors_carry_the_line() {
        let cases = [
            ("", 1),
            ("graph g {\n}\n", 1),
            ("digraph g {\n  \"a\";\n  \"a\" -> \"b\";\n}\n", 3),
            ("digraph g {\n  \"a\";\n  \"a\";\n}\n", 3),
            ("digraph g {\n  \"a\" [label=\"x];\n}\n", 2),
            ("digraph g {\n  \"a\" [label];\n}\n", 2),
            ("digraph g {\n  \"a\";\n", 2),
            ("digraph g {\n}\n\"a\";\n", 3),
            ("digraph g {\n  a @ b;\n}\n", 2),
        ];
        for (text, expected) in cases {
            match parse_dot(text) {
                Err(GraphError::Parse { line, .. }) => {
                    assert_eq!(line, expected, "wrong line for {text:?}")
                }
                other => panic!("expected parse error for {text:?}, got {other:?}"),
            }
        }
    }

    proptest! {
        #[test]
        fn node_and_edge_multisets_survive(
            ids in prop::collection::btree_set("[a-z0-9 \"\\\\]{1,6}", 1..6),
            label in "[a-z0-9 =\\[\\];,\"\\\\\n-]{0,12}",
            picks in prop::collection::vec((0usize..6, 0usize..6), 0..10),
        ) {
            let ids: Vec<String> = ids.into_iter().collect();
            let mut g = GraphDescription::new(label.clone());
            for id in &ids {
                g.add_node(id.clone(), [("label", label.clone())]).unwrap();
            }
            for (a, b) in picks {
                let from = &ids[a % ids.len()];
                let to = &ids[b % ids.len()];
                g.add_edge(from, to, [("label", label.clone())]).unwrap();
            }

            let parsed = parse_dot(&to_dot(&g)).unwrap();
            prop_assert_eq!(parsed.name(), g.name());
            prop_assert_eq!(parsed.sorted_nodes(), g.sorted_nodes());
            prop_assert_eq!(parsed.edge_multiset(), g.edge_multiset());
        }
    }
}
