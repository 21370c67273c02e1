//! Safe evaluation of user-editable arithmetic formulas.
//!
//! The source dashboard evaluated edge formulas by handing raw strings to a
//! host-language interpreter. This module replaces that with an explicitly
//! scoped grammar: arithmetic operators, unary minus, parentheses, numeric
//! literals, identifier substitution and a fixed allow-list of pure
//! functions. Nothing else parses.
//!
//! [`evaluate`] is total. Parse failures, unknown functions and non-finite
//! results all degrade to the 0.0 fallback; a dashboard consumer must always
//! have some value to display. Callers that need diagnostics use
//! [`validate`] instead.

mod eval;
mod lexer;
mod parser;

pub use parser::Function;

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Malformed expression. Reported by [`validate`]; [`evaluate`] returns
    /// the fallback instead.
    #[error("parse error: {0}")]
    Parse(String),
    /// Unknown function name or disallowed construct.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
}

/// A parsed expression, reusable across evaluations.
///
/// The propagation engine compiles each edge formula once per recompute and
/// runs it once per relaxation of the target node.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    ast: parser::Ast,
}

impl Program {
    pub fn compile(expr: &str) -> Result<Self, ExprError> {
        let tokens = lexer::tokenize(expr)?;
        let ast = parser::parse(&tokens)?;
        Ok(Self { ast })
    }

    /// Evaluates against a symbol context.
    ///
    /// Substitution is whole-token by construction: symbols are resolved on
    /// lexed identifier tokens, so a context entry for `beta` can never
    /// touch `beta2`. Unknown symbols read as 0.0; a non-finite result
    /// collapses to 0.0.
    pub fn run(&self, context: &HashMap<String, f64>) -> f64 {
        let value = eval::eval(&self.ast, context);
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// One-shot compile-and-run. Never raises; every fault yields 0.0.
pub fn evaluate(expr: &str, context: &HashMap<String, f64>) -> f64 {
    match Program::compile(expr) {
        Ok(program) => program.run(context),
        Err(_) => 0.0,
    }
}

/// Reports syntax and allow-list errors without evaluating.
pub fn validate(expr: &str) -> Result<(), ExprError> {
    Program::compile(expr).map(|_| ())
}
