use crate::error::QueryError;
use crate::graph::GraphStore;
use crate::types::{Edge, NodeId, Subgraph};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Bounded traversal utilities over the person graph
pub struct BoundedTraversal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// Follow parent links
    Upstream,
    /// Follow child links
    Downstream,
}

/// Everything reachable from a root in one direction.
///
/// `depths` holds the BFS distance of every reached node, the root included
/// at depth 0. `edges` keeps the parent -> child orientation of the graph.
#[derive(Debug, Clone)]
pub struct Cone {
    pub root: NodeId,
    pub direction: TraversalDirection,
    pub depths: HashMap<NodeId, usize>,
    pub edges: Subgraph,
}

impl Cone {
    pub fn contains(&self, id: NodeId) -> bool {
        self.depths.contains_key(&id)
    }

    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.depths.get(&id).copied()
    }

    /// Number of reached nodes, root included
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

impl BoundedTraversal {
    /// Ancestor lineage of `root`, plus its descendants unless `parents_only`
    pub fn ancestry_subgraph(
        store: &GraphStore,
        root: NodeId,
        parents_only: bool,
    ) -> Result<Subgraph, QueryError> {
        let ancestors = Self::cone(store, root, TraversalDirection::Upstream)?.edges;
        if parents_only {
            return Ok(ancestors);
        }

        let descendants = Self::cone(store, root, TraversalDirection::Downstream)?.edges;
        Ok(ancestors.union(descendants))
    }

    pub fn ancestor_cone(store: &GraphStore, root: NodeId) -> Result<Cone, QueryError> {
        Self::cone(store, root, TraversalDirection::Upstream)
    }

    pub fn descendant_cone(store: &GraphStore, root: NodeId) -> Result<Cone, QueryError> {
        Self::cone(store, root, TraversalDirection::Downstream)
    }

    /// Breadth-first expansion from `root`, each node expanded at most once
    pub fn cone(
        store: &GraphStore,
        root: NodeId,
        direction: TraversalDirection,
    ) -> Result<Cone, QueryError> {
        if !store.exists(root) {
            return Err(QueryError::NotFound(root));
        }

        let mut depths = HashMap::new();
        let mut edges = Subgraph::new();
        let mut queue = VecDeque::new();

        depths.insert(root, 0);
        queue.push_back((root, 0));

        while let Some((current, depth)) = queue.pop_front() {
            for next in Self::neighbors(store, current, direction) {
                let edge = match direction {
                    TraversalDirection::Upstream => Edge::new(next, current),
                    TraversalDirection::Downstream => Edge::new(current, next),
                };
                edges.insert(edge);

                if !depths.contains_key(&next) {
                    depths.insert(next, depth + 1);
                    queue.push_back((next, depth + 1));
                }
            }
        }

        debug!(
            "{:?} cone of {} reached {} people over {} edges",
            direction,
            root,
            depths.len(),
            edges.len()
        );

        Ok(Cone {
            root,
            direction,
            depths,
            edges,
        })
    }

    /// True once more than `limit` distinct descendants are found.
    ///
    /// Stops expanding as soon as the limit is crossed, so the work is
    /// bounded by the limit rather than by the size of the graph.
    pub fn descendants_count_exceeds(store: &GraphStore, root: NodeId, limit: usize) -> bool {
        Self::count_exceeds(store, root, limit, TraversalDirection::Downstream)
    }

    /// Mirror of `descendants_count_exceeds` over parent links
    pub fn ancestors_count_exceeds(store: &GraphStore, root: NodeId, limit: usize) -> bool {
        Self::count_exceeds(store, root, limit, TraversalDirection::Upstream)
    }

    fn count_exceeds(
        store: &GraphStore,
        root: NodeId,
        limit: usize,
        direction: TraversalDirection,
    ) -> bool {
        if !store.exists(root) {
            return false;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![root];
        let mut count = 0;
        visited.insert(root);

        while let Some(current) = stack.pop() {
            for next in Self::neighbors(store, current, direction) {
                if visited.insert(next) {
                    count += 1;
                    if count > limit {
                        debug!("{:?} count of {} exceeds {}", direction, root, limit);
                        return true;
                    }
                    stack.push(next);
                }
            }
        }

        false
    }

    /// Present neighbors of `id`, self-loops dropped
    fn neighbors(
        store: &GraphStore,
        id: NodeId,
        direction: TraversalDirection,
    ) -> impl Iterator<Item = NodeId> + '_ {
        let links = match direction {
            TraversalDirection::Upstream => store.parents(id),
            TraversalDirection::Downstream => store.children(id),
        };

        links
            .iter()
            .copied()
            .filter(move |&next| next != id && store.exists(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphInput;

    fn edges(pairs: &[(NodeId, NodeId)]) -> Subgraph {
        pairs.iter().map(|&pair| Edge::from(pair)).collect()
    }

    // 1 -> 2 -> 3 (A is parent of B, B is parent of C)
    fn create_chain() -> GraphStore {
        let input = GraphInput::new()
            .with_person(1, "A")
            .with_person(2, "B")
            .with_person(3, "C")
            .with_edge(1, 2)
            .with_edge(2, 3);
        GraphStore::try_build(input).unwrap()
    }

    //     1   2
    //    / \ /
    //   3   4
    //    \ / \
    //     5   6
    //     |
    //     7
    fn create_family() -> GraphStore {
        let mut input = GraphInput::new();
        for id in 1..=7 {
            input = input.with_person(id, format!("P{}", id));
        }
        for (parent, child) in [(1, 3), (1, 4), (2, 4), (3, 5), (4, 5), (4, 6), (5, 7)] {
            input = input.with_edge(parent, child);
        }
        GraphStore::try_build(input).unwrap()
    }

    #[test]
    fn test_ancestry_of_chain() {
        let store = create_chain();
        let subgraph = BoundedTraversal::ancestry_subgraph(&store, 3, true).unwrap();

        assert_eq!(subgraph, edges(&[(1, 2), (2, 3)]));
    }

    #[test]
    fn test_ancestry_shared_parent_expanded_once() {
        let store = create_family();
        let subgraph = BoundedTraversal::ancestry_subgraph(&store, 7, true).unwrap();

        assert_eq!(
            subgraph,
            edges(&[(1, 3), (1, 4), (2, 4), (3, 5), (4, 5), (5, 7)])
        );
    }

    #[test]
    fn test_root_without_parents_is_empty() {
        let store = create_family();
        let subgraph = BoundedTraversal::ancestry_subgraph(&store, 1, true).unwrap();

        assert!(subgraph.is_empty());
    }

    #[test]
    fn test_two_sided_view() {
        let store = create_family();
        let parents_only = BoundedTraversal::ancestry_subgraph(&store, 4, true).unwrap();
        let two_sided = BoundedTraversal::ancestry_subgraph(&store, 4, false).unwrap();
        let descendants = BoundedTraversal::descendant_cone(&store, 4).unwrap().edges;

        assert_eq!(parents_only, edges(&[(1, 4), (2, 4)]));
        assert_eq!(descendants, edges(&[(4, 5), (4, 6), (5, 7)]));
        assert_eq!(two_sided, parents_only.union(descendants));
    }

    #[test]
    fn test_halves_overlap_only_on_cycle_through_root() {
        // 0 -> 1 -> 2 -> 3 -> 1, 4 -> 2, 5 isolated
        let mut input = GraphInput::new();
        for id in 0..6 {
            input = input.with_person(id, format!("P{}", id));
        }
        let input = input
            .with_edge(0, 1)
            .with_edge(1, 2)
            .with_edge(2, 3)
            .with_edge(3, 1)
            .with_edge(4, 2);
        let store = GraphStore::try_build(input).unwrap();

        let shared = |root: NodeId| -> Subgraph {
            let ancestors = BoundedTraversal::ancestry_subgraph(&store, root, true).unwrap();
            let descendants = BoundedTraversal::descendant_cone(&store, root).unwrap().edges;
            ancestors
                .edges()
                .filter(|edge| descendants.contains(edge))
                .copied()
                .collect()
        };

        for root in [1, 2, 3] {
            assert_eq!(shared(root), edges(&[(1, 2), (2, 3), (3, 1)]));
        }
        for root in [0, 4, 5] {
            assert!(shared(root).is_empty());
        }

        let two_sided = BoundedTraversal::ancestry_subgraph(&store, 1, false).unwrap();
        assert_eq!(two_sided, edges(&[(0, 1), (1, 2), (2, 3), (3, 1), (4, 2)]));
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let store = create_chain();
        assert_eq!(
            BoundedTraversal::ancestry_subgraph(&store, 42, true),
            Err(QueryError::NotFound(42))
        );
    }

    #[test]
    fn test_self_loop_is_ignored() {
        let input = GraphInput::new()
            .with_person(1, "A")
            .with_person(2, "B")
            .with_edge(1, 2)
            .with_edge(2, 2);
        let store = GraphStore::try_build(input).unwrap();

        let subgraph = BoundedTraversal::ancestry_subgraph(&store, 2, false).unwrap();
        assert_eq!(subgraph, edges(&[(1, 2)]));
        assert!(!BoundedTraversal::descendants_count_exceeds(&store, 2, 0));
    }

    #[test]
    fn test_cycle_terminates() {
        let input = GraphInput::new()
            .with_person(1, "A")
            .with_person(2, "B")
            .with_person(3, "C")
            .with_edge(1, 2)
            .with_edge(2, 3)
            .with_edge(3, 1);
        let store = GraphStore::try_build(input).unwrap();

        let ancestors = BoundedTraversal::ancestry_subgraph(&store, 1, true).unwrap();
        assert_eq!(ancestors, edges(&[(1, 2), (2, 3), (3, 1)]));

        let cone = BoundedTraversal::ancestor_cone(&store, 1).unwrap();
        assert_eq!(cone.len(), 3);
        assert!(!BoundedTraversal::descendants_count_exceeds(&store, 1, 2));
        assert!(BoundedTraversal::descendants_count_exceeds(&store, 1, 1));
    }

    #[test]
    fn test_ancestor_cone_depths() {
        let store = create_family();
        let cone = BoundedTraversal::ancestor_cone(&store, 7).unwrap();

        assert_eq!(cone.depth(7), Some(0));
        assert_eq!(cone.depth(5), Some(1));
        assert_eq!(cone.depth(3), Some(2));
        assert_eq!(cone.depth(4), Some(2));
        assert_eq!(cone.depth(1), Some(3));
        assert_eq!(cone.depth(2), Some(3));
        assert_eq!(cone.depth(6), None);
    }

    #[test]
    fn test_descendants_count_exceeds() {
        let store = create_family();

        // 1 has descendants 3, 4, 5, 6, 7
        assert!(BoundedTraversal::descendants_count_exceeds(&store, 1, 4));
        assert!(!BoundedTraversal::descendants_count_exceeds(&store, 1, 5));
        assert!(!BoundedTraversal::descendants_count_exceeds(&store, 7, 0));
        assert!(!BoundedTraversal::descendants_count_exceeds(&store, 99, 0));
    }

    #[test]
    fn test_ancestors_count_exceeds() {
        let store = create_family();

        // 7 has ancestors 5, 3, 4, 1, 2
        assert!(BoundedTraversal::ancestors_count_exceeds(&store, 7, 4));
        assert!(!BoundedTraversal::ancestors_count_exceeds(&store, 7, 5));
        assert!(!BoundedTraversal::ancestors_count_exceeds(&store, 1, 0));
    }

    #[test]
    fn test_count_guard_stops_early_on_wide_graph() {
        let mut input = GraphInput::new().with_person(0, "root");
        for id in 1..=5_000 {
            input = input.with_person(id, format!("child {}", id)).with_edge(0, id);
        }
        let store = GraphStore::try_build(input).unwrap();

        assert!(BoundedTraversal::descendants_count_exceeds(&store, 0, 1000));
        assert!(!BoundedTraversal::descendants_count_exceeds(&store, 0, 5000));
    }
}
