use crate::types::NodeId;
use thiserror::Error;

/// Structural inconsistency found while building a graph store.
///
/// Reported once at construction; the offending edge is left out of the
/// adjacency and the store stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("edge {parent} -> {child} references undefined person {missing}")]
    UndefinedEndpoint {
        parent: NodeId,
        child: NodeId,
        missing: NodeId,
    },

    #[error("edge {parent} -> {child} is listed more than once")]
    DuplicateEdge { parent: NodeId, child: NodeId },
}

/// Outcome of a query that did not produce a result.
///
/// These are expected results, not internal failures: the UI layer turns
/// them into messages for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("person {0} not found")]
    NotFound(NodeId),

    #[error("no common ancestors between {0} and {1}")]
    NoCommonAncestor(NodeId, NodeId),

    #[error("no kinship path between {0} and {1}")]
    NoPath(NodeId, NodeId),

    #[error("ancestor cone of {root} exceeds {limit} people")]
    AncestorConeTooLarge { root: NodeId, limit: usize },
}

/// Failure to produce a graph store from raw input
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to parse graph document: {0}")]
    Parse(#[from] serde_json::Error),
}
