//! Core engine for causal dashboards: a directed, possibly cyclic graph of
//! quantities connected by weighted, formula-bearing edges, with two derived
//! views of it.
//!
//! - [`engine::compute_all`] settles a numeric value for every node from
//!   input values, baselines and edge formulas, via bounded iterative
//!   relaxation (cycles degrade to a best-effort pass, observably).
//! - [`influence::score_from`] computes a decayed, accumulated influence
//!   score for every node reachable from a chosen origin.
//!
//! Rendering, sliders, and pushing edited models anywhere are external
//! collaborators: they feed [`document::ModelDocument`]s and live values in
//! and consume the value and score maps coming out. Both computations are
//! synchronous, single-threaded and pure; callers serialize edits against
//! evaluations.

pub mod document;
pub mod engine;
pub mod expr;
pub mod graph;
pub mod influence;
pub mod resolver;

pub use document::{to_document, ModelDocument};
pub use engine::{compute_all, EdgeParamState, Settlement};
pub use expr::{evaluate, validate, ExprError, Program};
pub use graph::{
    ComputeMode, ComputeSpec, Edge, GraphModel, ModelError, Node, NodeKind, ParamDef, Sign,
    SliderSpec,
};
pub use influence::score_from;
pub use resolver::{extract_symbols, Resolved, TokenIndex};
