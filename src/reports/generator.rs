use crate::config::RenderSettings;
use crate::graph::GraphStore;
use crate::query::AncestryView;
use crate::reports::formatters::{DotFormatter, JsonFormatter, ReportFormatter, TextFormatter};
use crate::types::{Edge, NodeId, Subgraph};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;

/// Result of one query, ready to be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum QueryReport {
    Ancestry {
        root: NodeId,
        two_sided: bool,
        edges: Subgraph,
    },
    CommonAncestry {
        first: NodeId,
        second: NodeId,
        edges: Subgraph,
    },
    ClosestAncestor {
        first: NodeId,
        second: NodeId,
        ancestor: NodeId,
    },
    Path {
        first: NodeId,
        second: NodeId,
        path: Vec<NodeId>,
    },
}

/// How a person is emphasised in rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// The (first) queried person
    Primary,
    /// The second queried person
    Secondary,
    /// A result person, e.g. the closest common ancestor
    Emphasis,
}

impl From<AncestryView> for QueryReport {
    fn from(view: AncestryView) -> Self {
        QueryReport::Ancestry {
            root: view.root,
            two_sided: view.two_sided,
            edges: view.subgraph,
        }
    }
}

impl QueryReport {
    pub fn highlight(&self, id: NodeId) -> Option<Highlight> {
        match *self {
            QueryReport::Ancestry { root, .. } => (id == root).then_some(Highlight::Primary),
            QueryReport::CommonAncestry { first, second, .. }
            | QueryReport::Path { first, second, .. } => {
                if id == first {
                    Some(Highlight::Primary)
                } else if id == second {
                    Some(Highlight::Secondary)
                } else {
                    None
                }
            }
            QueryReport::ClosestAncestor {
                first,
                second,
                ancestor,
            } => {
                if id == first {
                    Some(Highlight::Primary)
                } else if id == second {
                    Some(Highlight::Secondary)
                } else if id == ancestor {
                    Some(Highlight::Emphasis)
                } else {
                    None
                }
            }
        }
    }

    /// Edges to draw; path steps keep the parent -> child orientation
    pub fn edges(&self, store: &GraphStore) -> Subgraph {
        match self {
            QueryReport::Ancestry { edges, .. } | QueryReport::CommonAncestry { edges, .. } => {
                edges.clone()
            }
            QueryReport::ClosestAncestor { .. } => Subgraph::new(),
            QueryReport::Path { path, .. } => path
                .windows(2)
                .map(|step| {
                    if store.children(step[0]).contains(&step[1]) {
                        Edge::new(step[0], step[1])
                    } else {
                        Edge::new(step[1], step[0])
                    }
                })
                .collect(),
        }
    }

    /// Every person that appears in the rendered output
    pub fn people(&self, store: &GraphStore) -> BTreeSet<NodeId> {
        let mut people = self.edges(store).nodes();
        match *self {
            QueryReport::Ancestry { root, .. } => {
                people.insert(root);
            }
            QueryReport::CommonAncestry { first, second, .. }
            | QueryReport::Path { first, second, .. } => {
                people.extend([first, second]);
            }
            QueryReport::ClosestAncestor {
                first,
                second,
                ancestor,
            } => {
                people.extend([first, second, ancestor]);
            }
        }
        people
    }
}

/// Report generator for creating various output formats
pub struct ReportGenerator {
    settings: RenderSettings,
}

impl ReportGenerator {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// Generate report in the specified format
    pub fn generate(
        &self,
        report: &QueryReport,
        store: &GraphStore,
        format: &str,
    ) -> Result<String> {
        match format.to_lowercase().as_str() {
            "dot" => DotFormatter::new(self.settings.clone()).format(report, store),
            "json" => JsonFormatter.format(report, store),
            "text" => TextFormatter.format(report, store),
            _ => Err(anyhow::anyhow!("Unsupported format: {}", format)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphInput;

    fn create_test_graph() -> GraphStore {
        let input = GraphInput::new()
            .with_person(1, "A")
            .with_person(2, "B")
            .with_person(3, "C")
            .with_edge(1, 2)
            .with_edge(1, 3);
        GraphStore::try_build(input).unwrap()
    }

    #[test]
    fn test_path_edges_follow_graph_orientation() {
        let store = create_test_graph();
        let report = QueryReport::Path {
            first: 2,
            second: 3,
            path: vec![2, 1, 3],
        };

        let edges: Vec<Edge> = report.edges(&store).edges().copied().collect();
        assert_eq!(edges, vec![Edge::new(1, 2), Edge::new(1, 3)]);
        assert_eq!(report.people(&store), BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_highlights() {
        let report = QueryReport::ClosestAncestor {
            first: 2,
            second: 3,
            ancestor: 1,
        };

        assert_eq!(report.highlight(2), Some(Highlight::Primary));
        assert_eq!(report.highlight(3), Some(Highlight::Secondary));
        assert_eq!(report.highlight(1), Some(Highlight::Emphasis));
        assert_eq!(report.highlight(4), None);
    }

    #[test]
    fn test_isolated_root_still_rendered() {
        let store = create_test_graph();
        let report = QueryReport::Ancestry {
            root: 1,
            two_sided: false,
            edges: Subgraph::new(),
        };

        assert_eq!(report.people(&store), BTreeSet::from([1]));
    }

    #[test]
    fn test_unsupported_format() {
        let store = create_test_graph();
        let generator = ReportGenerator::new(RenderSettings::default());
        let report = QueryReport::Path {
            first: 1,
            second: 2,
            path: vec![1, 2],
        };

        assert!(generator.generate(&report, &store, "svg").is_err());
        assert!(generator.generate(&report, &store, "TEXT").is_ok());
    }
}
