//! Live per-edge parameter values.

use indexmap::IndexMap;

use crate::graph::{Edge, GraphModel, ModelError};

/// Per-edge, per-parameter live numeric state.
///
/// Owned by the editing collaborator; the propagation engine only reads it,
/// as a snapshot for the duration of one `compute_all`. Values are clamped
/// to their [`crate::graph::ParamDef`] bounds on commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeParamState {
    values: IndexMap<String, IndexMap<String, f64>>,
}

impl EdgeParamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds every declared parameter from its default value.
    pub fn init_from(model: &GraphModel) -> Self {
        let mut state = Self::default();
        state.sync(model);
        state
    }

    /// Ensures a live entry exists for every declared parameter, seeding new
    /// ones from their defaults. Existing values are kept; idempotent. Call
    /// after edits that declare parameters (e.g. `set_edge_expr`).
    pub fn sync(&mut self, model: &GraphModel) {
        for edge in model.edges() {
            let slot = self.values.entry(edge.id.clone()).or_default();
            for (name, def) in &edge.params {
                slot.entry(name.clone()).or_insert(def.default_value);
            }
        }
    }

    /// Commits a live value, clamped to the parameter's declared bounds.
    /// Returns the value actually stored.
    pub fn set(
        &mut self,
        model: &GraphModel,
        edge_id: &str,
        name: &str,
        value: f64,
    ) -> Result<f64, ModelError> {
        let edge = model.edge(edge_id).ok_or_else(|| ModelError::UnknownEdge(edge_id.to_string()))?;
        let def = edge.params.get(name).ok_or_else(|| ModelError::UnknownParam {
            edge: edge_id.to_string(),
            param: name.to_string(),
        })?;
        let clamped = def.clamp(value);
        self.values.entry(edge_id.to_string()).or_default().insert(name.to_string(), clamped);
        Ok(clamped)
    }

    pub fn get(&self, edge_id: &str, name: &str) -> Option<f64> {
        self.values.get(edge_id)?.get(name).copied()
    }

    /// Evaluation-time resolution: live value, then declared default, then 0.
    pub fn value_or_default(&self, edge: &Edge, name: &str) -> f64 {
        if let Some(value) = self.get(&edge.id, name) {
            return value;
        }
        edge.params.get(name).map(|def| def.default_value).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node, ParamDef};

    fn model() -> GraphModel {
        let mut m = GraphModel::new();
        m.add_node(Node::input("a")).unwrap();
        m.add_node(Node::computed("b")).unwrap();
        m.add_edge(Edge::new("e1", "a", "b").with_param(
            "beta",
            ParamDef { min: 0.0, max: 10.0, default_value: 2.0, ..ParamDef::default() },
        ))
        .unwrap();
        m
    }

    #[test]
    fn init_seeds_defaults() {
        let m = model();
        let state = EdgeParamState::init_from(&m);
        assert_eq!(state.get("e1", "beta"), Some(2.0));
    }

    #[test]
    fn set_clamps_on_commit() {
        let m = model();
        let mut state = EdgeParamState::init_from(&m);
        assert_eq!(state.set(&m, "e1", "beta", 99.0).unwrap(), 10.0);
        assert_eq!(state.get("e1", "beta"), Some(10.0));
        assert_eq!(state.set(&m, "e1", "beta", -5.0).unwrap(), 0.0);
    }

    #[test]
    fn set_rejects_unknown_edge_or_param() {
        let m = model();
        let mut state = EdgeParamState::init_from(&m);
        assert!(matches!(state.set(&m, "nope", "beta", 1.0), Err(ModelError::UnknownEdge(_))));
        assert!(matches!(state.set(&m, "e1", "nope", 1.0), Err(ModelError::UnknownParam { .. })));
    }

    #[test]
    fn value_or_default_prefers_live_state() {
        let m = model();
        let mut state = EdgeParamState::new();
        // No live entry yet: declared default wins.
        assert_eq!(state.value_or_default(m.edge("e1").unwrap(), "beta"), 2.0);
        // Undeclared name: 0.
        assert_eq!(state.value_or_default(m.edge("e1").unwrap(), "gamma"), 0.0);
        state.set(&m, "e1", "beta", 7.0).unwrap();
        assert_eq!(state.value_or_default(m.edge("e1").unwrap(), "beta"), 7.0);
        // Sync after the fact must not clobber the live value.
        state.sync(&m);
        assert_eq!(state.value_or_default(m.edge("e1").unwrap(), "beta"), 7.0);
    }
}
