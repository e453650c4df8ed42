pub mod formatters;
pub mod generator;

pub use formatters::{DotFormatter, JsonFormatter, ReportFormatter, TextFormatter};
pub use generator::{Highlight, QueryReport, ReportGenerator};
