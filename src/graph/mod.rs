pub mod input;
pub mod store;

pub use input::GraphInput;
pub use store::{BuildReport, GraphStore};
