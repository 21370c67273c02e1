//! The in-memory graph arena: nodes, edges and their adjacency indices.
//!
//! Backed by a `petgraph` stable graph so indices survive removals and the
//! outgoing/incoming adjacency is maintained incrementally rather than
//! recomputed per query. String ids map to arena indices through ordered
//! lookup tables, so iteration follows insertion order.
//!
//! Cycles are legal here. The model layer rejects only structural faults
//! (duplicate ids, dangling endpoints, removal of a still-referenced node);
//! cyclic dependencies are handled downstream by the propagation engine.

use indexmap::IndexMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use thiserror::Error;

use super::edge::{Edge, ParamDef};
use super::node::Node;
use crate::resolver;

/// Structural faults, rejected at the mutation boundary before they can
/// corrupt the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("node '{node}' is still referenced by {edges} edge(s)")]
    ReferentialIntegrity { node: String, edges: usize },
    #[error("duplicate id '{0}'")]
    DuplicateId(String),
    #[error("unknown node '{0}'")]
    UnknownNode(String),
    #[error("unknown edge '{0}'")]
    UnknownEdge(String),
    #[error("edge '{edge}' has no parameter '{param}'")]
    UnknownParam { edge: String, param: String },
}

#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    pub(crate) graph: StableDiGraph<Node, Edge>,
    node_ids: IndexMap<String, NodeIndex>,
    edge_ids: IndexMap<String, EdgeIndex>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_ids.len()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), ModelError> {
        if self.node_ids.contains_key(&node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_ids.insert(id, idx);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), ModelError> {
        if self.edge_ids.contains_key(&edge.id) {
            return Err(ModelError::DuplicateId(edge.id));
        }
        let source = self.node_index(&edge.source).ok_or_else(|| ModelError::UnknownNode(edge.source.clone()))?;
        let target = self.node_index(&edge.target).ok_or_else(|| ModelError::UnknownNode(edge.target.clone()))?;
        let id = edge.id.clone();
        let idx = self.graph.add_edge(source, target, edge);
        self.edge_ids.insert(id, idx);
        Ok(())
    }

    /// Removes a node with no remaining edge references.
    ///
    /// Fails with [`ModelError::ReferentialIntegrity`] and leaves the model
    /// unchanged while any edge (including a self-loop) still references the
    /// node; callers must remove those edges first.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, ModelError> {
        let idx = self.node_index(id).ok_or_else(|| ModelError::UnknownNode(id.to_string()))?;
        let referencing = self.graph.edges(idx).count()
            + self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .filter(|e| e.source() != idx)
                .count();
        if referencing > 0 {
            return Err(ModelError::ReferentialIntegrity { node: id.to_string(), edges: referencing });
        }
        self.node_ids.shift_remove(id);
        // The weight is always present: the index came from our own table.
        Ok(self.graph.remove_node(idx).unwrap())
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, ModelError> {
        let idx = self.edge_ids.shift_remove(id).ok_or_else(|| ModelError::UnknownEdge(id.to_string()))?;
        Ok(self.graph.remove_edge(idx).unwrap())
    }

    pub(crate) fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_ids.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        Some(&self.graph[self.node_index(id)?])
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        Some(&self.graph[*self.edge_ids.get(id)?])
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        Some(&mut self.graph[*self.edge_ids.get(id)?])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_ids.values().map(move |&idx| &self.graph[idx])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_ids.values().map(move |&idx| &self.graph[idx])
    }

    /// Edges leaving the node, via the incrementally maintained adjacency.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.adjacent(id, Direction::Outgoing)
    }

    /// Edges arriving at the node.
    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.adjacent(id, Direction::Incoming)
    }

    fn adjacent(&self, id: &str, dir: Direction) -> impl Iterator<Item = &Edge> {
        self.node_index(id)
            .into_iter()
            .flat_map(move |idx| self.graph.edges_directed(idx, dir).map(|e| e.weight()))
    }

    /// True iff the node has no incoming edges and at least one outgoing
    /// edge. The slider UI drives exactly these nodes.
    pub fn is_source_node(&self, id: &str) -> bool {
        match self.node_index(id) {
            Some(idx) => {
                self.graph.edges_directed(idx, Direction::Incoming).next().is_none()
                    && self.graph.edges_directed(idx, Direction::Outgoing).next().is_some()
            }
            None => false,
        }
    }

    // --- Edit operations (issued by the editing collaborator) ------------
    //
    // All of these mutate in place; the caller re-runs `compute_all` after.

    pub fn set_baseline(&mut self, node_id: &str, baseline: f64) -> Result<(), ModelError> {
        let idx = self.node_index(node_id).ok_or_else(|| ModelError::UnknownNode(node_id.to_string()))?;
        self.graph[idx].baseline = baseline;
        Ok(())
    }

    /// Declares (or redefines) a parameter on an edge.
    pub fn declare_param(&mut self, edge_id: &str, name: &str, def: ParamDef) -> Result<(), ModelError> {
        let edge = self.edge_mut(edge_id).ok_or_else(|| ModelError::UnknownEdge(edge_id.to_string()))?;
        edge.params.insert(name.to_string(), def);
        Ok(())
    }

    /// Redefines the bounds/default of an existing parameter.
    pub fn update_param_def(&mut self, edge_id: &str, name: &str, def: ParamDef) -> Result<(), ModelError> {
        let edge = self.edge_mut(edge_id).ok_or_else(|| ModelError::UnknownEdge(edge_id.to_string()))?;
        match edge.params.get_mut(name) {
            Some(slot) => {
                *slot = def;
                Ok(())
            }
            None => Err(ModelError::UnknownParam { edge: edge_id.to_string(), param: name.to_string() }),
        }
    }

    /// Replaces an edge's machine-readable expression.
    ///
    /// Re-extracts the `uses` list from the new expression and auto-creates
    /// a [`ParamDef`] for every newly referenced parameter. Callers holding
    /// an [`crate::engine::EdgeParamState`] should `sync` it afterwards so
    /// the new parameters get live values.
    pub fn set_edge_expr(&mut self, edge_id: &str, expr: &str) -> Result<(), ModelError> {
        let uses = resolver::extract_symbols(expr);
        let edge = self.edge_mut(edge_id).ok_or_else(|| ModelError::UnknownEdge(edge_id.to_string()))?;
        edge.compute.expr = expr.to_string();
        edge.compute.uses = uses.iter().cloned().collect();
        for name in &uses {
            if !edge.params.contains_key(name) {
                edge.params.insert(name.clone(), ParamDef::declared(name));
            }
        }
        Ok(())
    }
}
