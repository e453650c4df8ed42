pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod query;
pub mod reports;
pub mod types;

pub use error::{GraphError, InputError, QueryError};
pub use graph::{BuildReport, GraphInput, GraphStore};
pub use query::{BoundedTraversal, CommonAncestorFinder, PathFinder, QueryEngine};
pub use types::{Edge, NodeId, Person, Subgraph};
