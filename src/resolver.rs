//! Symbol extraction and token resolution for formula strings.
//!
//! Extraction is purely lexical and tolerates malformed expressions, so the
//! editing collaborator can keep an edge's `uses` list in sync while the
//! user types. The [`TokenIndex`] is a derived cache over node identities,
//! labels and aliases; rebuild it whenever any of those change. It is never
//! a source of truth.

use indexmap::{IndexMap, IndexSet};

use crate::expr::Function;
use crate::graph::{Edge, GraphModel};

/// Names injected by the per-edge evaluation context. They are never
/// extracted as parameters and never resolve to nodes.
pub const RESERVED: [&str; 4] = ["from", "baselineFrom", "baselineTarget", "fromDelta"];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Identifier tokens actually referenced by an expression, in first-seen
/// order, de-duplicated, with reserved context names and allow-listed
/// function names filtered out.
pub fn extract_symbols(expr: &str) -> Vec<String> {
    let mut out: IndexSet<String> = IndexSet::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c == 'Δ' || is_ident_start(c) {
            let mut token = String::new();
            if c == 'Δ' {
                token.push(c);
                chars.next();
                if !matches!(chars.peek(), Some(&d) if is_ident_start(d)) {
                    continue;
                }
            }
            while let Some(&d) = chars.peek() {
                if !is_ident_continue(d) {
                    break;
                }
                token.push(d);
                chars.next();
            }
            let name = token.as_str();
            if !RESERVED.contains(&name) && !Function::NAMES.contains(&name) {
                out.insert(token);
            }
        } else if c.is_ascii_digit() {
            // Skip whole number bodies so "2e3" never surfaces an "e".
            while matches!(chars.peek(), Some(&d) if is_ident_continue(d) || d == '.') {
                chars.next();
            }
        } else {
            chars.next();
        }
    }

    out.into_iter().collect()
}

/// Binding of a formula token, per the strict resolution priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The token names a graph node. `delta` marks a leading Δ, meaning
    /// "delta of this node".
    NodeBound { id: String, delta: bool },
    /// The token names a parameter declared on the edge under resolution.
    ParamBound { name: String },
    /// No binding; the evaluator will substitute 0 for it.
    Unknown(String),
}

/// Maps candidate formula tokens to node ids.
///
/// Candidates per node: the id, the snake-cased label, declared aliases,
/// each matched case-insensitively and with an optional Δ prefix.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    ids: IndexMap<String, String>,
    labels: IndexMap<String, String>,
    aliases: IndexMap<String, String>,
}

impl TokenIndex {
    pub fn build(model: &GraphModel) -> Self {
        let mut index = Self::default();
        for node in model.nodes() {
            index.ids.insert(node.id.to_lowercase(), node.id.clone());
            let label = snake(&node.label);
            if !label.is_empty() {
                index.labels.entry(label).or_insert_with(|| node.id.clone());
            }
            for alias in &node.aliases {
                if !alias.is_empty() {
                    index.aliases.entry(alias.to_lowercase()).or_insert_with(|| node.id.clone());
                }
            }
        }
        index
    }

    /// Resolves a token with strict priority: exact node id, then
    /// normalized label, then alias, then the Δ-prefixed variants of those,
    /// then a parameter of `edge`, then unknown.
    pub fn resolve(&self, token: &str, edge: Option<&Edge>) -> Resolved {
        let (bare, delta) = match token.strip_prefix('Δ') {
            Some(rest) => (rest, true),
            None => (token, false),
        };

        if let Some(id) = self.node_lookup(bare) {
            return Resolved::NodeBound { id, delta };
        }

        if let Some(edge) = edge {
            let lower = bare.to_lowercase();
            if let Some(name) = edge.params.keys().find(|n| n.to_lowercase() == lower) {
                return Resolved::ParamBound { name: name.clone() };
            }
        }

        Resolved::Unknown(token.to_string())
    }

    fn node_lookup(&self, token: &str) -> Option<String> {
        let lower = token.to_lowercase();
        self.ids
            .get(&lower)
            .or_else(|| self.labels.get(&lower))
            .or_else(|| self.aliases.get(&lower))
            .cloned()
    }
}

/// Lowercases and squeezes non-alphanumeric runs to single underscores,
/// trimming them at both ends: "Truck km (total)" -> "truck_km_total".
fn snake(label: &str) -> String {
    let mut out = String::new();
    let mut pending_sep = false;
    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node, ParamDef};

    #[test]
    fn extraction_preserves_order_and_dedupes() {
        let symbols = extract_symbols("beta * TRUCK_KM + beta - gamma");
        assert_eq!(symbols, ["beta", "TRUCK_KM", "gamma"]);
    }

    #[test]
    fn extraction_filters_reserved_and_functions() {
        let symbols = extract_symbols("from * min(beta, fromDelta) + sqrt(baselineTarget)");
        assert_eq!(symbols, ["beta"]);
    }

    #[test]
    fn extraction_keeps_delta_tokens_whole() {
        let symbols = extract_symbols("ΔTRUCK_KM * k");
        assert_eq!(symbols, ["ΔTRUCK_KM", "k"]);
    }

    #[test]
    fn extraction_ignores_exponent_suffixes() {
        assert_eq!(extract_symbols("2e3 + 1.5 * x"), ["x"]);
    }

    #[test]
    fn extraction_tolerates_malformed_input() {
        assert_eq!(extract_symbols("beta * (unclosed"), ["beta", "unclosed"]);
    }

    fn model_with_node(node: Node) -> GraphModel {
        let mut m = GraphModel::new();
        m.add_node(node).unwrap();
        m
    }

    #[test]
    fn resolves_node_id_case_insensitively() {
        let m = model_with_node(Node::input("truck_km"));
        let index = TokenIndex::build(&m);
        assert_eq!(
            index.resolve("TRUCK_KM", None),
            Resolved::NodeBound { id: "truck_km".into(), delta: false }
        );
    }

    #[test]
    fn resolves_snake_cased_label_and_alias() {
        let node = Node {
            aliases: vec!["LE".into()],
            ..Node::computed("n1").with_label("Life Expectancy")
        };
        let m = model_with_node(node);
        let index = TokenIndex::build(&m);
        assert_eq!(
            index.resolve("life_expectancy", None),
            Resolved::NodeBound { id: "n1".into(), delta: false }
        );
        assert_eq!(
            index.resolve("le", None),
            Resolved::NodeBound { id: "n1".into(), delta: false }
        );
    }

    #[test]
    fn delta_variant_marks_resolution() {
        let m = model_with_node(Node::input("truck_km"));
        let index = TokenIndex::build(&m);
        assert_eq!(
            index.resolve("Δtruck_km", None),
            Resolved::NodeBound { id: "truck_km".into(), delta: true }
        );
    }

    #[test]
    fn node_binding_wins_over_edge_param() {
        let mut m = GraphModel::new();
        m.add_node(Node::input("beta")).unwrap();
        m.add_node(Node::computed("b")).unwrap();
        m.add_edge(Edge::new("e1", "beta", "b").with_param("beta", ParamDef::declared("beta")))
            .unwrap();
        let index = TokenIndex::build(&m);
        let edge = m.edge("e1").unwrap();
        assert_eq!(
            index.resolve("beta", Some(edge)),
            Resolved::NodeBound { id: "beta".into(), delta: false }
        );
    }

    #[test]
    fn unmatched_token_falls_through_to_param_then_unknown() {
        let mut m = GraphModel::new();
        m.add_node(Node::input("a")).unwrap();
        m.add_node(Node::computed("b")).unwrap();
        m.add_edge(Edge::new("e1", "a", "b").with_param("Beta", ParamDef::declared("Beta")))
            .unwrap();
        let index = TokenIndex::build(&m);
        let edge = m.edge("e1").unwrap();
        assert_eq!(index.resolve("beta", Some(edge)), Resolved::ParamBound { name: "Beta".into() });
        assert_eq!(index.resolve("Δbeta", Some(edge)), Resolved::ParamBound { name: "Beta".into() });
        assert_eq!(index.resolve("mystery", Some(edge)), Resolved::Unknown("mystery".into()));
        assert_eq!(index.resolve("beta", None), Resolved::Unknown("beta".into()));
    }
}
