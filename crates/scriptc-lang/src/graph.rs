//! Statement graph of a compiled [`Program`].
//!
//! One node per statement (`s<line>`), labelled with the statement text and
//! shaped `box` for `let`, `ellipse` for `print`. A `data` edge runs from
//! the binding in scope to each statement that reads it; `control` edges
//! chain consecutive statements.

use std::collections::HashMap;

use scriptc_graph::{GraphDescription, GraphError, GraphProducer};

use crate::program::{Program, StatementKind};

/// [`GraphProducer`] for script programs.
#[derive(Debug, Clone, Default)]
pub struct ScriptGraph {
    name: Option<String>,
}

impl ScriptGraph {
    pub fn new() -> Self {
        ScriptGraph::default()
    }

    /// Graph title written into the DOT header; `script` when unset.
    pub fn named(name: impl Into<String>) -> Self {
        ScriptGraph {
            name: Some(name.into()),
        }
    }
}

fn node_id(line: u32) -> String {
    format!("s{line}")
}

impl GraphProducer<Program> for ScriptGraph {
    fn produce_graph(&self, program: &Program) -> Result<GraphDescription, GraphError> {
        let mut graph = GraphDescription::new(self.name.as_deref().unwrap_or("script"));
        // name -> node id of the statement currently binding it
        let mut scope: HashMap<&str, String> = HashMap::new();
        let mut previous: Option<String> = None;

        for stmt in program.statements() {
            let id = node_id(stmt.line);
            let shape = match stmt.kind {
                StatementKind::Let { .. } => "box",
                StatementKind::Print { .. } => "ellipse",
            };
            graph.add_node(
                id.clone(),
                [("label", stmt.text.as_str()), ("shape", shape)],
            )?;

            if let Some(prev) = &previous {
                graph.add_edge(
                    prev,
                    &id,
                    [("kind", "control"), ("style", "dashed")],
                )?;
            }

            let mut seen: Vec<&str> = Vec::new();
            for (name, _) in stmt.value().names() {
                if seen.contains(&name) {
                    continue;
                }
                seen.push(name);
                let from = scope.get(name).ok_or_else(|| {
                    GraphError::Producer(format!(
                        "line {}: '{name}' read before it is bound",
                        stmt.line
                    ))
                })?;
                graph.add_edge(from, &id, [("kind", "data"), ("label", name)])?;
            }

            if let Some(name) = stmt.binds() {
                scope.insert(name, id.clone());
            }
            previous = Some(id);
        }

        Ok(graph)
    }
}
