//! Graph description model and the producer contract.
//!
//! A [`GraphDescription`] is a directed multigraph over petgraph's
//! `StableGraph`. Nodes carry a unique string id plus ordered attributes;
//! edges carry ordered attributes only. Attribute order is kept (via
//! `IndexMap`) so the DOT output is deterministic.

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Directed;

use crate::error::GraphError;

/// Ordered `key -> value` attribute list.
pub type Attrs = IndexMap<String, String>;

/// A node with a unique id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub attrs: Attrs,
}

/// A directed edge's attributes. Endpoints live in the graph structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphEdge {
    pub attrs: Attrs,
}

/// Node/edge structure of a compiled artifact.
#[derive(Debug, Clone)]
pub struct GraphDescription {
    name: String,
    graph: StableGraph<GraphNode, GraphEdge, Directed, u32>,
    by_id: HashMap<String, NodeIndex<u32>>,
}

/// Canonical edge form used for structural comparison: endpoints by id plus
/// attributes in declaration order.
pub type EdgeKey = (String, String, Vec<(String, String)>);

fn collect_attrs<K, V>(attrs: impl IntoIterator<Item = (K, V)>) -> Attrs
where
    K: Into<String>,
    V: Into<String>,
{
    attrs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl GraphDescription {
    pub fn new(name: impl Into<String>) -> Self {
        GraphDescription {
            name: name.into(),
            graph: StableGraph::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only access to the underlying petgraph structure.
    pub fn graph(&self) -> &StableGraph<GraphNode, GraphEdge, Directed, u32> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds a node. Ids must be unique within the graph.
    pub fn add_node<K, V>(
        &mut self,
        id: impl Into<String>,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<NodeIndex<u32>, GraphError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let idx = self.graph.add_node(GraphNode {
            id: id.clone(),
            attrs: collect_attrs(attrs),
        });
        self.by_id.insert(id, idx);
        Ok(idx)
    }

    /// Returns the node with `id`, declaring it without attributes if absent.
    pub fn ensure_node(&mut self, id: &str) -> NodeIndex<u32> {
        if let Some(idx) = self.by_id.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(GraphNode {
            id: id.to_string(),
            attrs: Attrs::new(),
        });
        self.by_id.insert(id.to_string(), idx);
        idx
    }

    /// Adds an edge between two declared nodes. Parallel edges are allowed.
    pub fn add_edge<K, V>(
        &mut self,
        from: &str,
        to: &str,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<EdgeIndex<u32>, GraphError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let a = *self
            .by_id
            .get(from)
            .ok_or_else(|| GraphError::UnknownNode(from.to_string()))?;
        let b = *self
            .by_id
            .get(to)
            .ok_or_else(|| GraphError::UnknownNode(to.to_string()))?;
        Ok(self.graph.add_edge(
            a,
            b,
            GraphEdge {
                attrs: collect_attrs(attrs),
            },
        ))
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.by_id.get(id).and_then(|idx| self.graph.node_weight(*idx))
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Edges in declaration order as `(from_id, to_id, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &GraphEdge)> + '_ {
        let mut edges: Vec<_> = self.graph.edge_references().collect();
        edges.sort_by_key(|e| e.id().index());
        edges.into_iter().map(move |e| {
            (
                self.graph[e.source()].id.as_str(),
                self.graph[e.target()].id.as_str(),
                e.weight(),
            )
        })
    }

    /// Nodes sorted by id, for order-independent comparison.
    pub fn sorted_nodes(&self) -> Vec<GraphNode> {
        let mut nodes: Vec<GraphNode> = self.nodes().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// The edge multiset in a canonical sorted form.
    pub fn edge_multiset(&self) -> Vec<EdgeKey> {
        let mut edges: Vec<EdgeKey> = self
            .edges()
            .map(|(from, to, edge)| {
                (
                    from.to_string(),
                    to.to_string(),
                    edge.attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                )
            })
            .collect();
        edges.sort();
        edges
    }

    /// Same nodes (ids and attributes) and same edge multiset.
    pub fn same_structure(&self, other: &GraphDescription) -> bool {
        self.sorted_nodes() == other.sorted_nodes() && self.edge_multiset() == other.edge_multiset()
    }
}

/// Describes a compiled artifact as a graph.
///
/// Invoked only when an artifact exists, i.e. after a successful compile.
pub trait GraphProducer<A: ?Sized> {
    fn produce_graph(&self, artifact: &A) -> Result<GraphDescription, GraphError>;
}

impl<A: ?Sized, G: GraphProducer<A> + ?Sized> GraphProducer<A> for &G {
    fn produce_graph(&self, artifact: &A) -> Result<GraphDescription, GraphError> {
        (**self).produce_graph(artifact)
    }
}
