pub mod common;
pub mod engine;
pub mod path;
pub mod traversal;

pub use common::CommonAncestorFinder;
pub use engine::{AncestryView, QueryEngine};
pub use path::PathFinder;
pub use traversal::{BoundedTraversal, Cone, TraversalDirection};
