use crate::error::QueryError;
use crate::graph::GraphStore;
use crate::types::NodeId;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Kinship paths, following parent and child links alike
pub struct PathFinder;

impl PathFinder {
    /// Shortest kinship path from `from` to `to`, both ends included.
    ///
    /// Neighbors are expanded parents first, then children, ascending id
    /// within each group; among equally short paths the first one found
    /// under that order is returned.
    pub fn shortest_path(
        store: &GraphStore,
        from: NodeId,
        to: NodeId,
    ) -> Result<Vec<NodeId>, QueryError> {
        for id in [from, to] {
            if !store.exists(id) {
                return Err(QueryError::NotFound(id));
            }
        }

        if from == to {
            return Ok(vec![from]);
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut predecessor: HashMap<NodeId, NodeId> = HashMap::new();

        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for next in Self::kin(store, current) {
                if !visited.insert(next) {
                    continue;
                }
                predecessor.insert(next, current);

                if next == to {
                    let path = Self::reconstruct(&predecessor, to);
                    debug!("Kinship path {} -> {} has {} steps", from, to, path.len() - 1);
                    return Ok(path);
                }
                queue.push_back(next);
            }
        }

        Err(QueryError::NoPath(from, to))
    }

    /// Number of links on the shortest kinship path
    pub fn kinship_distance(
        store: &GraphStore,
        from: NodeId,
        to: NodeId,
    ) -> Result<usize, QueryError> {
        Self::shortest_path(store, from, to).map(|path| path.len() - 1)
    }

    /// Parents ascending, then children ascending
    fn kin(store: &GraphStore, id: NodeId) -> Vec<NodeId> {
        let present = |&next: &NodeId| next != id && store.exists(next);

        let mut parents: Vec<NodeId> = store
            .parents(id)
            .iter()
            .copied()
            .filter(present)
            .collect();
        let mut children: Vec<NodeId> = store
            .children(id)
            .iter()
            .copied()
            .filter(present)
            .collect();
        parents.sort_unstable();
        children.sort_unstable();

        parents.extend(children);
        parents
    }

    fn reconstruct(predecessor: &HashMap<NodeId, NodeId>, to: NodeId) -> Vec<NodeId> {
        let mut path = vec![to];
        let mut current = to;

        while let Some(&previous) = predecessor.get(&current) {
            path.push(previous);
            current = previous;
        }

        path.reverse();
        path
    }
}
