use crate::error::QueryError;
use crate::graph::GraphStore;
use crate::query::traversal::{BoundedTraversal, Cone};
use crate::types::{NodeId, Subgraph};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

/// Common-ancestry queries between two people.
///
/// Both ancestor cones are computed in full. Callers facing very large
/// cones should check `BoundedTraversal::ancestors_count_exceeds` first.
pub struct CommonAncestorFinder;

impl CommonAncestorFinder {
    /// People present in both ancestor cones (each cone includes its root)
    pub fn common_ancestors(
        store: &GraphStore,
        first: NodeId,
        second: NodeId,
    ) -> Result<BTreeSet<NodeId>, QueryError> {
        let first_cone = BoundedTraversal::ancestor_cone(store, first)?;
        let second_cone = BoundedTraversal::ancestor_cone(store, second)?;

        Ok(Self::intersect(&first_cone, &second_cone))
    }

    /// Lineages connecting both people to every common ancestor.
    ///
    /// An edge is kept when both endpoints are either a common ancestor or a
    /// member of one of the cones that descends from a common ancestor.
    pub fn common_ancestry_subgraph(
        store: &GraphStore,
        first: NodeId,
        second: NodeId,
    ) -> Result<Subgraph, QueryError> {
        let first_cone = BoundedTraversal::ancestor_cone(store, first)?;
        let second_cone = BoundedTraversal::ancestor_cone(store, second)?;

        let common = Self::intersect(&first_cone, &second_cone);
        if common.is_empty() {
            return Err(QueryError::NoCommonAncestor(first, second));
        }

        // Walk down from the common ancestors, staying inside the two cones
        let mut connectors: HashSet<NodeId> = common.iter().copied().collect();
        let mut queue: VecDeque<NodeId> = common.iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            for &child in store.children(current) {
                if child == current {
                    continue;
                }
                let in_cone = first_cone.contains(child) || second_cone.contains(child);
                if in_cone && connectors.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        let subgraph: Subgraph = first_cone
            .edges
            .edges()
            .chain(second_cone.edges.edges())
            .filter(|edge| connectors.contains(&edge.source) && connectors.contains(&edge.target))
            .copied()
            .collect();

        debug!(
            "Common ancestry of {} and {}: {} common ancestors, {} edges",
            first,
            second,
            common.len(),
            subgraph.len()
        );

        Ok(subgraph)
    }

    /// The common ancestor with the smallest combined BFS depth.
    ///
    /// Ties go to the smaller depth from `first`, then to the smaller id.
    pub fn closest_ancestor(
        store: &GraphStore,
        first: NodeId,
        second: NodeId,
    ) -> Result<NodeId, QueryError> {
        let first_cone = BoundedTraversal::ancestor_cone(store, first)?;
        let second_cone = BoundedTraversal::ancestor_cone(store, second)?;

        first_cone
            .depths
            .iter()
            .filter_map(|(&id, &first_depth)| {
                second_cone
                    .depth(id)
                    .map(|second_depth| (first_depth + second_depth, first_depth, id))
            })
            .min()
            .map(|(_, _, id)| id)
            .ok_or(QueryError::NoCommonAncestor(first, second))
    }

    fn intersect(first: &Cone, second: &Cone) -> BTreeSet<NodeId> {
        first
            .depths
            .keys()
            .filter(|&&id| second.contains(id))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphInput;
    use crate::types::Edge;

    fn edges(pairs: &[(NodeId, NodeId)]) -> Subgraph {
        pairs.iter().map(|&pair| Edge::from(pair)).collect()
    }

    //        1
    //       / \
    //  9   2   3   10
    //   \ /     \ /
    //    4       5
    //    |       |
    //    6       7
    //
    // 8 stands alone with its own parent 11
    fn create_cousins() -> GraphStore {
        let mut input = GraphInput::new();
        for id in 1..=11 {
            input = input.with_person(id, format!("P{}", id));
        }
        for (parent, child) in [
            (1, 2),
            (1, 3),
            (2, 4),
            (9, 4),
            (3, 5),
            (10, 5),
            (4, 6),
            (5, 7),
            (11, 8),
        ] {
            input = input.with_edge(parent, child);
        }
        GraphStore::try_build(input).unwrap()
    }

    #[test]
    fn test_common_ancestry_of_cousins() {
        let store = create_cousins();
        let subgraph = CommonAncestorFinder::common_ancestry_subgraph(&store, 6, 7).unwrap();

        // side lines through 9 and 10 do not lead to the common ancestor
        assert_eq!(
            subgraph,
            edges(&[(1, 2), (1, 3), (2, 4), (3, 5), (4, 6), (5, 7)])
        );
    }

    #[test]
    fn test_common_ancestors_symmetric() {
        let store = create_cousins();
        let forward = CommonAncestorFinder::common_ancestors(&store, 6, 7).unwrap();
        let backward = CommonAncestorFinder::common_ancestors(&store, 7, 6).unwrap();

        assert_eq!(forward, BTreeSet::from([1]));
        assert_eq!(forward, backward);

        let forward = CommonAncestorFinder::common_ancestry_subgraph(&store, 6, 7).unwrap();
        let backward = CommonAncestorFinder::common_ancestry_subgraph(&store, 7, 6).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_disjoint_lineages() {
        let store = create_cousins();

        assert_eq!(
            CommonAncestorFinder::common_ancestry_subgraph(&store, 6, 8),
            Err(QueryError::NoCommonAncestor(6, 8))
        );
        assert_eq!(
            CommonAncestorFinder::closest_ancestor(&store, 6, 8),
            Err(QueryError::NoCommonAncestor(6, 8))
        );
    }

    #[test]
    fn test_missing_person() {
        let store = create_cousins();
        assert_eq!(
            CommonAncestorFinder::common_ancestry_subgraph(&store, 6, 500),
            Err(QueryError::NotFound(500))
        );
    }

    #[test]
    fn test_direct_lineage() {
        let store = create_cousins();

        // 2 is itself an ancestor of 6
        let subgraph = CommonAncestorFinder::common_ancestry_subgraph(&store, 2, 6).unwrap();
        assert_eq!(subgraph, edges(&[(1, 2), (2, 4), (4, 6)]));
        assert_eq!(CommonAncestorFinder::closest_ancestor(&store, 2, 6), Ok(2));
    }

    #[test]
    fn test_closest_ancestor() {
        let store = create_cousins();

        assert_eq!(CommonAncestorFinder::closest_ancestor(&store, 6, 7), Ok(1));
        assert_eq!(CommonAncestorFinder::closest_ancestor(&store, 4, 4), Ok(4));
    }

    #[test]
    fn test_closest_ancestor_tie_break() {
        // 3 and 4 both have parents 1 and 2; every candidate scores 2
        let input = GraphInput::new()
            .with_person(1, "A")
            .with_person(2, "B")
            .with_person(3, "C")
            .with_person(4, "D")
            .with_edge(2, 3)
            .with_edge(1, 3)
            .with_edge(2, 4)
            .with_edge(1, 4);
        let store = GraphStore::try_build(input).unwrap();

        assert_eq!(CommonAncestorFinder::closest_ancestor(&store, 3, 4), Ok(1));
        assert_eq!(
            CommonAncestorFinder::common_ancestors(&store, 3, 4).unwrap(),
            BTreeSet::from([1, 2])
        );
    }

    #[test]
    fn test_closest_prefers_shorter_total_depth() {
        // 5 reaches 1 in two steps from both sides, 2 is closer to both
        let input = GraphInput::new()
            .with_person(1, "A")
            .with_person(2, "B")
            .with_person(3, "C")
            .with_person(4, "D")
            .with_person(5, "E")
            .with_edge(1, 2)
            .with_edge(2, 3)
            .with_edge(2, 4)
            .with_edge(1, 5);
        let store = GraphStore::try_build(input).unwrap();

        assert_eq!(CommonAncestorFinder::closest_ancestor(&store, 3, 4), Ok(2));
        assert_eq!(CommonAncestorFinder::closest_ancestor(&store, 3, 5), Ok(1));
    }
}
