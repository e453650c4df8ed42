use crate::error::{GraphError, InputError};
use crate::graph::input::GraphInput;
use crate::types::{GraphStatistics, NodeId, Person};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Immutable adjacency representation of the person graph.
///
/// Slots are indexed by id and sized `max(id) + 1`; ids that never name a
/// person are stored as `None` and behave as absent for every lookup.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    slots: Vec<Option<Person>>,
    name_index: HashMap<String, Vec<NodeId>>,
    edge_count: usize,
}

/// A freshly built store and the structural issues found while building it
#[derive(Debug)]
pub struct BuildReport {
    pub store: GraphStore,
    pub issues: Vec<InputError>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Reject the build if any issue was recorded
    pub fn into_strict(self) -> Result<GraphStore, GraphError> {
        match self.issues.into_iter().next() {
            Some(issue) => Err(GraphError::Input(issue)),
            None => Ok(self.store),
        }
    }
}

impl GraphStore {
    /// Build a store, keeping it usable even when the input is inconsistent
    pub fn build(input: GraphInput) -> BuildReport {
        let capacity = input.max_id().map_or(0, |max| max as usize + 1);
        let mut slots: Vec<Option<Person>> = vec![None; capacity];
        let mut name_index: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut holes = 0;

        // First pass: people
        for (id, name) in input.nodes {
            match name {
                Some(name) if !name.is_empty() => {
                    name_index
                        .entry(name.trim().to_string())
                        .or_default()
                        .push(id);
                    slots[id as usize] = Some(Person::new(id, name));
                }
                _ => holes += 1,
            }
        }

        // Second pass: parent -> child edges
        let mut issues = Vec::new();
        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut edge_count = 0;

        for [parent, child] in input.edges {
            let present = |id: NodeId| matches!(slots.get(id as usize), Some(Some(_)));
            let missing = [parent, child].into_iter().find(|&id| !present(id));

            if let Some(missing) = missing {
                let issue = InputError::UndefinedEndpoint {
                    parent,
                    child,
                    missing,
                };
                warn!("{}", issue);
                issues.push(issue);
                continue;
            }

            if !seen.insert((parent, child)) {
                let issue = InputError::DuplicateEdge { parent, child };
                warn!("{}", issue);
                issues.push(issue);
                continue;
            }

            if let Some(person) = slots[parent as usize].as_mut() {
                person.children.push(child);
            }
            if let Some(person) = slots[child as usize].as_mut() {
                person.parents.push(parent);
            }
            edge_count += 1;
        }

        let store = GraphStore {
            slots,
            name_index,
            edge_count,
        };

        info!(
            "Graph store built with {} people, {} edges ({} holes, {} input issues)",
            store.len(),
            store.edge_count(),
            holes,
            issues.len()
        );

        BuildReport { store, issues }
    }

    /// Build a store, failing on the first structural issue
    pub fn try_build(input: GraphInput) -> Result<Self, GraphError> {
        Self::build(input).into_strict()
    }

    /// Look up a person; `None` for holes and out-of-range ids
    pub fn get(&self, id: NodeId) -> Option<&Person> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Parent ids in input order; empty for absent ids
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |person| person.parents.as_slice())
    }

    /// Child ids in input order; empty for absent ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |person| person.children.as_slice())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|person| person.name.as_str())
    }

    /// Exact lookup by display name. When the name is shared the highest id wins.
    pub fn id_for_name(&self, name: &str) -> Option<NodeId> {
        self.ids_for_name(name).last().copied()
    }

    /// Every id carrying the given display name, ascending
    pub fn ids_for_name(&self, name: &str) -> &[NodeId] {
        self.name_index
            .get(name.trim())
            .map_or(&[], |ids| ids.as_slice())
    }

    /// Number of present people
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Size of the id space, `max(id) + 1`
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Strongly connected components that make the graph cyclic.
    ///
    /// Traversals never rely on this; it only reports malformed input.
    pub fn find_cycles(&self) -> Vec<Vec<NodeId>> {
        let mut graph: DiGraphMap<NodeId, ()> = DiGraphMap::new();
        for person in self.people() {
            for &child in &person.children {
                graph.add_edge(person.id, child, ());
            }
        }

        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || graph.contains_edge(component[0], component[0])
            })
            .map(|mut component| {
                component.sort_unstable();
                component
            })
            .collect();
        cycles.sort();

        debug!("Found {} cyclic components", cycles.len());
        cycles
    }

    pub fn statistics(&self) -> GraphStatistics {
        let mut total_people = 0;
        let mut root_people = 0;
        let mut leaf_people = 0;
        let mut self_loops = 0;
        let mut total_degree = 0;

        for person in self.people() {
            total_people += 1;
            if person.is_root() {
                root_people += 1;
            }
            if person.is_leaf() {
                leaf_people += 1;
            }
            if person.has_self_loop() {
                self_loops += 1;
            }
            total_degree += person.parents.len() + person.children.len();
        }

        let average_degree = if total_people > 0 {
            total_degree as f64 / total_people as f64
        } else {
            0.0
        };

        GraphStatistics {
            total_people,
            total_edges: self.edge_count,
            capacity: self.capacity(),
            root_people,
            leaf_people,
            self_loops,
            average_degree,
        }
    }
}
