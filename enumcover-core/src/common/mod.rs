//! Utilities shared across the pipeline stages.

mod graph_trait;

pub use graph_trait::GraphTraversal;
