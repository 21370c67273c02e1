//! Influence diffusion: decayed reachability scores from an origin node.
//!
//! Not a shortest-path computation. Two diffusion paths to the same node
//! both contribute, modeling reinforcement through multiple causal routes;
//! the damping factor guarantees eventual decay even on unit-weight cycles,
//! and the (node, depth) visit cap bounds total work to O(V·D) regardless
//! of density.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::graph::GraphModel;

/// Decay applied at every hop.
pub const DAMPING: f64 = 0.6;
/// Contributions below this are discarded, bounding fan-out on long chains.
pub const MIN_FLOW: f64 = 0.02;
/// Coarse cap on diffusion depth.
pub const MAX_DEPTH: u8 = 8;
/// A target is only re-enqueued when its score grows by more than this,
/// preventing infinite re-queueing from floating-point noise.
const EPSILON: f64 = 1e-6;

/// Accumulated, decayed influence of `origin` on every reachable node.
///
/// The origin scores 1.0; unreached nodes are absent and must be read as 0.
/// Edge weights are clamped to [0, 1] at use-time. An unknown origin yields
/// an empty map.
pub fn score_from(model: &GraphModel, origin: &str) -> IndexMap<String, f64> {
    let mut scores: IndexMap<String, f64> = IndexMap::new();
    let Some(origin_idx) = model.node_index(origin) else {
        return scores;
    };
    scores.insert(origin.to_string(), 1.0);

    let mut queue = VecDeque::from([(origin_idx, 0u8)]);
    let mut seen = HashSet::new();

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= MAX_DEPTH || !seen.insert((current, depth)) {
            continue;
        }

        let current_score = scores.get(&model.graph[current].id).copied().unwrap_or(0.0);
        for edge in model.graph.edges_directed(current, Direction::Outgoing) {
            let weight = edge.weight().weight.clamp(0.0, 1.0);
            let flow = current_score * weight;
            if flow < MIN_FLOW {
                continue;
            }

            let target = edge.target();
            let target_id = &model.graph[target].id;
            let previous = scores.get(target_id).copied().unwrap_or(0.0);
            let next = previous + flow * DAMPING;
            if next > previous + EPSILON {
                scores.insert(target_id.clone(), next);
                queue.push_back((target, depth + 1));
            }
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn chain(weights: &[f64]) -> GraphModel {
        let mut m = GraphModel::new();
        m.add_node(Node::input("n0")).unwrap();
        for (i, &w) in weights.iter().enumerate() {
            m.add_node(Node::computed(format!("n{}", i + 1))).unwrap();
            m.add_edge(
                Edge::new(format!("e{i}"), format!("n{i}"), format!("n{}", i + 1)).with_weight(w),
            )
            .unwrap();
        }
        m
    }

    #[test]
    fn origin_scores_one_and_unreachable_are_absent() {
        let mut m = chain(&[0.5]);
        m.add_node(Node::computed("isolated")).unwrap();
        let scores = score_from(&m, "n0");
        assert_eq!(scores.get("n0"), Some(&1.0));
        assert!(scores.get("isolated").is_none());
    }

    #[test]
    fn unknown_origin_yields_empty_map() {
        let m = chain(&[0.5]);
        assert!(score_from(&m, "missing").is_empty());
    }

    #[test]
    fn two_hop_chain_decays_per_hop() {
        let m = chain(&[0.5, 0.5]);
        let scores = score_from(&m, "n0");
        // 0.5 * 0.6, then 0.3 * 0.5 * 0.6
        assert!((scores["n1"] - 0.3).abs() < 1e-9);
        assert!((scores["n2"] - 0.09).abs() < 1e-9);
    }

    #[test]
    fn long_decaying_chain_stops_contributing() {
        // Flows: 0.5, 0.15, 0.045, 0.0135 < MIN_FLOW -> dropped.
        let m = chain(&[0.5; 6]);
        let scores = score_from(&m, "n0");
        assert!(scores.contains_key("n3"));
        assert!(!scores.contains_key("n4"));
        assert!(!scores.contains_key("n5"));
    }

    #[test]
    fn weights_clamp_to_unit_interval() {
        let m = chain(&[5.0]);
        let scores = score_from(&m, "n0");
        assert!((scores["n1"] - 0.6).abs() < 1e-9);
    }

    #[test]
    fn parallel_paths_accumulate() {
        let mut m = GraphModel::new();
        for id in ["a", "b", "c", "d"] {
            m.add_node(Node::computed(id)).unwrap();
        }
        m.add_edge(Edge::new("e1", "a", "b").with_weight(0.5)).unwrap();
        m.add_edge(Edge::new("e2", "a", "c").with_weight(0.5)).unwrap();
        m.add_edge(Edge::new("e3", "b", "d").with_weight(0.5)).unwrap();
        m.add_edge(Edge::new("e4", "c", "d").with_weight(0.5)).unwrap();
        let scores = score_from(&m, "a");
        // Each route contributes 0.3 * 0.5 * 0.6 = 0.09.
        assert!((scores["d"] - 0.18).abs() < 1e-9);
    }

    #[test]
    fn unit_weight_cycle_terminates() {
        let mut m = GraphModel::new();
        m.add_node(Node::computed("a")).unwrap();
        m.add_node(Node::computed("b")).unwrap();
        m.add_edge(Edge::new("e1", "a", "b").with_weight(1.0)).unwrap();
        m.add_edge(Edge::new("e2", "b", "a").with_weight(1.0)).unwrap();
        let scores = score_from(&m, "a");
        assert!(scores["a"] >= 1.0);
        assert!(scores["a"].is_finite());
        assert!(scores["b"].is_finite());
    }
}
