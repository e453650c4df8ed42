use crate::error::GraphError;
use crate::graph::{BuildReport, GraphInput, GraphStore};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loads the exported genealogy document and builds the graph store
#[derive(Debug, Clone)]
pub struct GraphLoader {
    graph_path: PathBuf,
}

impl GraphLoader {
    pub fn new<P: AsRef<Path>>(graph_path: P) -> Self {
        Self {
            graph_path: graph_path.as_ref().to_path_buf(),
        }
    }

    pub fn graph_path(&self) -> &Path {
        &self.graph_path
    }

    /// Read and build the graph; structural issues are logged, not fatal
    pub fn load(&self) -> Result<BuildReport> {
        debug!("Loading graph from: {:?}", self.graph_path);

        let content = fs::read_to_string(&self.graph_path)
            .with_context(|| format!("Failed to read graph document from {:?}", self.graph_path))?;

        let report = Self::parse_str(&content)
            .with_context(|| format!("Failed to build graph from {:?}", self.graph_path))?;

        if !report.is_clean() {
            warn!(
                "Graph document {:?} has {} structural issues; affected edges were skipped",
                self.graph_path,
                report.issues.len()
            );
        }

        info!(
            "Successfully loaded graph with {} people and {} edges",
            report.store.len(),
            report.store.edge_count()
        );
        Ok(report)
    }

    /// Parse a JSON document of the form `{"nodes": {"id": "name"}, "edges": [[parent, child]]}`
    pub fn parse_str(content: &str) -> Result<BuildReport, GraphError> {
        let input: GraphInput = serde_json::from_str(content)?;
        Ok(GraphStore::build(input))
    }
}
