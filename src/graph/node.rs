//! Defines the `Node` type and its descriptors, representing a single
//! quantity in the causal graph.

use serde::{Deserialize, Serialize};

/// Whether a quantity is externally driven or derived from incoming edges.
///
/// The propagation engine seeds `Input` nodes from the caller-supplied value
/// set and never clamps them; `Computed` nodes are evaluated as
/// `baseline + sum of incoming edge contributions` and clamped to the
/// display range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// An externally driven quantity (slider-backed in the UI).
    Input,
    /// A derived quantity. Any unrecognized kind in a model document is
    /// treated as computed, matching the original dashboard data.
    #[default]
    Computed,
}

impl From<String> for NodeKind {
    fn from(kind: String) -> Self {
        if kind == "Input" {
            Self::Input
        } else {
            Self::Computed
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Input => "Input",
            NodeKind::Computed => "Computed",
        }
        .to_string()
    }
}

/// Bounds descriptor for nodes intended to be externally driven.
///
/// Purely descriptive from the engine's point of view: the (out-of-scope)
/// slider UI reads it, the engine does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Default for SliderSpec {
    fn default() -> Self {
        Self { min: 0.0, max: 100.0, step: 1.0, default: 0.0 }
    }
}

/// A quantity in the causal graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique, stable identifier. Formula tokens may reference it directly.
    pub id: String,
    /// Display name; not semantically load-bearing, but its snake-cased form
    /// is a resolvable formula token.
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Optional descriptive unit (e.g. "USD", "km").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// The value this node holds absent any incoming contribution; also the
    /// reference point for delta-mode formulas.
    #[serde(default)]
    pub baseline: f64,
    /// Present only for nodes meant to be externally drivable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider: Option<SliderSpec>,
    /// Extra formula tokens that resolve to this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Node {
    /// A computed node with the given id, label defaulting to the id.
    pub fn computed(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind: NodeKind::Computed,
            unit: None,
            baseline: 0.0,
            slider: None,
            aliases: Vec::new(),
        }
    }

    /// An input node with the given id.
    pub fn input(id: impl Into<String>) -> Self {
        Self { kind: NodeKind::Input, ..Self::computed(id) }
    }

    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_input(&self) -> bool {
        self.kind == NodeKind::Input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_deserializes_as_computed() {
        let n: Node = serde_json::from_str(r#"{"id": "x", "type": "Outcome"}"#).unwrap();
        assert_eq!(n.kind, NodeKind::Computed);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let n: Node = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(n.kind, NodeKind::Computed);
        assert_eq!(n.baseline, 0.0);
        assert!(n.slider.is_none());
        assert!(n.aliases.is_empty());
    }
}
