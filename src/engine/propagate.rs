//! Bounded iterative relaxation of node values.
//!
//! A node settles once every incoming edge originates from an already
//! settled node; its value is `baseline + Σ evaluate(edge)` over incoming
//! edges. Cycles never settle that way, so after the guard limit (or an
//! earlier fixed point) the leftovers are evaluated once with whatever
//! upstream values exist. That best-effort step is a deliberate, documented
//! approximation of cyclic feedback, not a failure: the result always
//! carries a value for every node, and non-convergence is observable on the
//! returned [`Settlement`].

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{trace, warn};

use super::params::EdgeParamState;
use crate::expr::Program;
use crate::graph::{ComputeMode, Edge, GraphModel};
use crate::resolver::RESERVED;

/// Maximum number of relaxation passes.
pub const GUARD_LIMIT: usize = 200;

/// Presentation safeguard applied to computed nodes after summation; input
/// values are never clamped.
pub const DISPLAY_RANGE: (f64, f64) = (0.0, 100.0);

/// The settled value set produced by one [`compute_all`] call.
///
/// Rebuilt on every recompute, never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settlement {
    /// Node id -> settled value, in settle order.
    pub values: IndexMap<String, f64>,
    /// False when a cyclic component had to be evaluated best-effort.
    pub converged: bool,
    /// Nodes whose dependencies never settled, in model order.
    pub unsettled: Vec<String>,
}

impl Settlement {
    /// A node's settled value; absent nodes read as 0.
    pub fn value(&self, id: &str) -> f64 {
        self.values.get(id).copied().unwrap_or(0.0)
    }
}

/// Computes a settled value for every node in the model.
///
/// Pure function of its four inputs, safe to call on every input or
/// parameter change. Input nodes take the supplied value, falling back to
/// their baseline, and are never clamped.
pub fn compute_all(
    model: &GraphModel,
    inputs: &HashMap<String, f64>,
    params: &EdgeParamState,
) -> Settlement {
    // Parse each edge formula once; unparsable formulas contribute 0.
    let programs: IndexMap<&str, Option<Program>> = model
        .edges()
        .map(|e| (e.id.as_str(), Program::compile(&e.compute.expr).ok()))
        .collect();

    let mut values: IndexMap<String, f64> = IndexMap::with_capacity(model.node_count());
    for node in model.nodes() {
        if node.is_input() {
            values.insert(node.id.clone(), inputs.get(&node.id).copied().unwrap_or(node.baseline));
        }
    }

    let total = model.node_count();
    let mut passes = 0;
    while values.len() < total && passes < GUARD_LIMIT {
        let mut progressed = false;

        for node in model.nodes() {
            if values.contains_key(&node.id) {
                continue;
            }
            let ready = model.incoming(&node.id).all(|e| values.contains_key(&e.source));
            if !ready {
                continue;
            }

            let mut value = node.baseline;
            for edge in model.incoming(&node.id) {
                value += run_edge(edge, model, &values, params, &programs);
            }
            values.insert(node.id.clone(), clamp_display(value));
            progressed = true;
        }

        if !progressed {
            break;
        }
        passes += 1;
        trace!(pass = passes, settled = values.len(), "relaxation pass");
    }

    // Cyclic leftovers: evaluate once with partially-stale upstream values.
    let mut unsettled = Vec::new();
    if values.len() < total {
        for node in model.nodes() {
            if values.contains_key(&node.id) {
                continue;
            }
            let mut value = node.baseline;
            for edge in model.incoming(&node.id) {
                value += run_edge(edge, model, &values, params, &programs);
            }
            values.insert(node.id.clone(), clamp_display(value));
            unsettled.push(node.id.clone());
        }
        warn!(
            nodes = unsettled.len(),
            passes, "cyclic component did not settle; values are best-effort"
        );
    }

    Settlement { values, converged: unsettled.is_empty(), unsettled }
}

fn clamp_display(value: f64) -> f64 {
    value.clamp(DISPLAY_RANGE.0, DISPLAY_RANGE.1)
}

/// Evaluates one edge against the current value set.
///
/// Context: `from` = settled source value (0 if unavailable); one entry per
/// declared `uses` name, live param -> declared default -> 0; delta mode
/// additionally sees `baselineFrom`, `baselineTarget` and `fromDelta`.
fn run_edge(
    edge: &Edge,
    model: &GraphModel,
    values: &IndexMap<String, f64>,
    params: &EdgeParamState,
    programs: &IndexMap<&str, Option<Program>>,
) -> f64 {
    let from = values.get(&edge.source).copied().unwrap_or(0.0);
    let mut context = HashMap::new();
    context.insert("from".to_string(), from);

    if edge.compute.mode == ComputeMode::Delta {
        let baseline_from = model.node(&edge.source).map(|n| n.baseline).unwrap_or(0.0);
        let baseline_target = model.node(&edge.target).map(|n| n.baseline).unwrap_or(0.0);
        context.insert("baselineFrom".to_string(), baseline_from);
        context.insert("baselineTarget".to_string(), baseline_target);
        context.insert("fromDelta".to_string(), from - baseline_from);
    }

    for name in &edge.compute.uses {
        // A declared `uses` entry may not shadow the reserved context names.
        if RESERVED.contains(&name.as_str()) {
            continue;
        }
        context.insert(name.clone(), params.value_or_default(edge, name));
    }

    match programs.get(edge.id.as_str()) {
        Some(Some(program)) => program.run(&context),
        _ => 0.0,
    }
}
