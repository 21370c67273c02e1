//! Defines the core data structures for the causal graph.
pub mod edge;
pub mod model;
pub mod node;

// Re-export key types for convenient access
pub use edge::{ComputeMode, ComputeSpec, Edge, ParamDef, Sign};
pub use model::{GraphModel, ModelError};
pub use node::{Node, NodeKind, SliderSpec};
