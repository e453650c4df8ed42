use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Core types shared by the graph store, the queries and the reports

/// Identifier of a person in the genealogy graph
pub type NodeId = u32;

/// A present person together with its ordered parent and child lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: NodeId,
    pub name: String,
    pub parents: Vec<NodeId>,
    pub children: Vec<NodeId>,
}

impl Person {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents.iter().all(|&p| p == self.id)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|&c| c == self.id)
    }

    pub fn has_self_loop(&self) -> bool {
        self.children.contains(&self.id)
    }
}

/// Directed parent -> child edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl From<(NodeId, NodeId)> for Edge {
    fn from((source, target): (NodeId, NodeId)) -> Self {
        Self { source, target }
    }
}

/// Edge set produced by a query.
///
/// Backed by an ordered set, so every directed pair appears once no matter
/// how many traversal paths discovered it, and iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subgraph {
    edges: BTreeSet<Edge>,
}

impl Subgraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge; returns false when it was already present
    pub fn insert(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Every node touched by an edge of the subgraph
    pub fn nodes(&self) -> BTreeSet<NodeId> {
        self.edges
            .iter()
            .flat_map(|edge| [edge.source, edge.target])
            .collect()
    }

    /// Set union, consuming both operands
    pub fn union(mut self, other: Subgraph) -> Subgraph {
        self.edges.extend(other.edges);
        self
    }

    /// Hand the subgraph to petgraph-based layout consumers
    pub fn to_graph_map(&self) -> DiGraphMap<NodeId, ()> {
        let mut graph = DiGraphMap::new();
        for edge in &self.edges {
            graph.add_edge(edge.source, edge.target, ());
        }
        graph
    }
}

impl FromIterator<Edge> for Subgraph {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Subgraph {
    type Item = &'a Edge;
    type IntoIter = std::collections::btree_set::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub total_people: usize,
    pub total_edges: usize,
    pub capacity: usize,
    pub root_people: usize,
    pub leaf_people: usize,
    pub self_loops: usize,
    pub average_degree: f64,
}
