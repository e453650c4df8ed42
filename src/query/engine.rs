use crate::config::QueryLimits;
use crate::error::QueryError;
use crate::graph::GraphStore;
use crate::query::common::CommonAncestorFinder;
use crate::query::path::PathFinder;
use crate::query::traversal::BoundedTraversal;
use crate::types::{NodeId, Subgraph};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point for the UI layer: the three query shapes with size guards
/// applied before any expensive traversal
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<GraphStore>,
    limits: QueryLimits,
}

/// Ancestry view of one person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestryView {
    pub root: NodeId,
    pub subgraph: Subgraph,
    /// False when only the ancestor half was produced
    pub two_sided: bool,
}

impl QueryEngine {
    pub fn new(store: Arc<GraphStore>, limits: QueryLimits) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// Ancestry of `root`, degraded to ancestors only when its descendants
    /// exceed the configured limit
    pub fn ancestry(&self, root: NodeId, parents_only: bool) -> Result<AncestryView, QueryError> {
        let limit = self.limits.two_sided_descendant_limit;
        let mut parents_only = parents_only;

        if !parents_only && BoundedTraversal::descendants_count_exceeds(&self.store, root, limit) {
            warn!(
                "Person {} has more than {} descendants, showing ancestors only",
                root, limit
            );
            parents_only = true;
        }

        let subgraph = BoundedTraversal::ancestry_subgraph(&self.store, root, parents_only)?;
        info!(
            "Ancestry of {} ({}): {} edges",
            root,
            if parents_only { "ancestors only" } else { "two-sided" },
            subgraph.len()
        );

        Ok(AncestryView {
            root,
            subgraph,
            two_sided: !parents_only,
        })
    }

    pub fn common_ancestry(&self, first: NodeId, second: NodeId) -> Result<Subgraph, QueryError> {
        self.guard_ancestor_cones(first, second)?;

        let subgraph = CommonAncestorFinder::common_ancestry_subgraph(&self.store, first, second)?;
        info!(
            "Common ancestry of {} and {}: {} edges",
            first,
            second,
            subgraph.len()
        );
        Ok(subgraph)
    }

    pub fn closest_ancestor(&self, first: NodeId, second: NodeId) -> Result<NodeId, QueryError> {
        self.guard_ancestor_cones(first, second)?;

        let ancestor = CommonAncestorFinder::closest_ancestor(&self.store, first, second)?;
        info!("Closest common ancestor of {} and {}: {}", first, second, ancestor);
        Ok(ancestor)
    }

    pub fn shortest_path(&self, first: NodeId, second: NodeId) -> Result<Vec<NodeId>, QueryError> {
        let path = PathFinder::shortest_path(&self.store, first, second)?;
        info!("Kinship path {} -> {}: {} people", first, second, path.len());
        Ok(path)
    }

    /// Refuse common-ancestry work when either cone is past the limit
    fn guard_ancestor_cones(&self, first: NodeId, second: NodeId) -> Result<(), QueryError> {
        let limit = self.limits.common_ancestry_cone_limit;

        for root in [first, second] {
            if !self.store.exists(root) {
                return Err(QueryError::NotFound(root));
            }
            if BoundedTraversal::ancestors_count_exceeds(&self.store, root, limit) {
                warn!("Ancestor cone of {} exceeds {} people", root, limit);
                return Err(QueryError::AncestorConeTooLarge { root, limit });
            }
        }

        Ok(())
    }
}
