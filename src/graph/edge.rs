//! Defines the `Edge` type: a weighted, formula-bearing causal relationship
//! between two nodes, and the per-edge parameter definitions its formula
//! draws on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Cosmetic polarity marker carried over from the source data.
///
/// Diffusion and propagation both ignore it; the rendering layer colors
/// edges with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sign {
    #[default]
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

/// How an edge formula interprets its source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeMode {
    /// The formula sees `from` = the settled value of the source node.
    #[default]
    Direct,
    /// Additionally sees `baselineFrom`, `baselineTarget` and
    /// `fromDelta = from - baselineFrom`.
    Delta,
}

/// Machine-evaluable formula descriptor for an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeSpec {
    #[serde(default)]
    pub mode: ComputeMode,
    /// Expression in the restricted arithmetic grammar of [`crate::expr`].
    #[serde(default = "zero_expr")]
    pub expr: String,
    /// Symbol names the expression is declared to reference, in order.
    /// Each resolves to a live parameter value, a parameter default, or 0.
    #[serde(default)]
    pub uses: SmallVec<[String; 4]>,
}

fn zero_expr() -> String {
    "0".to_string()
}

impl Default for ComputeSpec {
    fn default() -> Self {
        Self { mode: ComputeMode::Direct, expr: zero_expr(), uses: SmallVec::new() }
    }
}

impl ComputeSpec {
    pub fn direct(expr: impl Into<String>) -> Self {
        Self { mode: ComputeMode::Direct, expr: expr.into(), uses: SmallVec::new() }
    }

    pub fn delta(expr: impl Into<String>) -> Self {
        Self { mode: ComputeMode::Delta, expr: expr.into(), uses: SmallVec::new() }
    }

    pub fn with_uses<I, S>(mut self, uses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uses = uses.into_iter().map(Into::into).collect();
        self
    }
}

/// Bounded numeric control attached to an edge formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(rename = "defaultValue", default)]
    pub default_value: f64,
}

fn default_max() -> f64 {
    100.0
}

fn default_step() -> f64 {
    1.0
}

impl Default for ParamDef {
    fn default() -> Self {
        Self {
            label: String::new(),
            description: String::new(),
            unit: String::new(),
            min: 0.0,
            max: 100.0,
            step: 1.0,
            default_value: 0.0,
        }
    }
}

impl ParamDef {
    /// The definition auto-created when a formula references a parameter
    /// that has not been declared yet: min 0, max 100, step 1, default 0.
    pub fn declared(name: &str) -> Self {
        Self { label: name.to_string(), ..Self::default() }
    }

    /// Clamps a candidate live value to this parameter's bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// A directed causal relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique, stable identifier.
    pub id: String,
    pub source: String,
    pub target: String,
    /// Influence weight, nominal range [0, 1]; clamped at use-time by the
    /// diffusion algorithm. Documents that omit it get 0.3.
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub sign: Sign,
    /// Human-readable formula, display-only.
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub compute: ComputeSpec,
    /// Parameter definitions scoped to this edge. Populated from the model
    /// document's `baseVars` section at load time, never serialized inline.
    #[serde(skip)]
    pub params: IndexMap<String, ParamDef>,
}

fn default_weight() -> f64 {
    0.3
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            weight: default_weight(),
            sign: Sign::Plus,
            formula: String::new(),
            compute: ComputeSpec::default(),
            params: IndexMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_compute(mut self, compute: ComputeSpec) -> Self {
        self.compute = compute;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, def: ParamDef) -> Self {
        self.params.insert(name.into(), def);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_weight_defaults_to_nominal() {
        let e: Edge = serde_json::from_str(r#"{"id": "e1", "source": "a", "target": "b"}"#).unwrap();
        assert_eq!(e.weight, 0.3);
        assert_eq!(e.compute.expr, "0");
        assert_eq!(e.compute.mode, ComputeMode::Direct);
    }

    #[test]
    fn compute_spec_round_trips_mode_names() {
        let e: Edge = serde_json::from_str(
            r#"{"id": "e1", "source": "a", "target": "b",
                "compute": {"mode": "delta", "expr": "fromDelta * beta", "uses": ["beta"]}}"#,
        )
        .unwrap();
        assert_eq!(e.compute.mode, ComputeMode::Delta);
        assert_eq!(e.compute.uses.as_slice(), ["beta"]);
    }

    #[test]
    fn param_clamp_respects_bounds() {
        let def = ParamDef { min: -1.0, max: 2.5, ..ParamDef::default() };
        assert_eq!(def.clamp(10.0), 2.5);
        assert_eq!(def.clamp(-3.0), -1.0);
        assert_eq!(def.clamp(0.5), 0.5);
    }
}
