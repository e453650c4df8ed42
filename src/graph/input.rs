use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw graph document as produced by the exporter.
///
/// `nodes` maps an id to its display name; a null or empty name marks a hole
/// in the id space. `edges` lists `[parent, child]` pairs in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, Option<String>>,
    #[serde(default)]
    pub edges: Vec<[NodeId; 2]>,
}

impl GraphInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_person(mut self, id: NodeId, name: impl Into<String>) -> Self {
        self.nodes.insert(id, Some(name.into()));
        self
    }

    pub fn with_hole(mut self, id: NodeId) -> Self {
        self.nodes.insert(id, None);
        self
    }

    pub fn with_edge(mut self, parent: NodeId, child: NodeId) -> Self {
        self.edges.push([parent, child]);
        self
    }

    /// Largest id mentioned among the node entries
    pub fn max_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }
}
