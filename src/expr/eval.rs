//! AST evaluation over a numeric symbol context.

use std::collections::HashMap;

use super::parser::{Ast, BinaryOp, Function, UnaryOp};

pub(super) fn eval(ast: &Ast, context: &HashMap<String, f64>) -> f64 {
    match ast {
        Ast::Number(n) => *n,
        // Unresolved symbols substitute 0 and evaluation continues.
        Ast::Symbol(name) => context.get(name).copied().unwrap_or(0.0),
        Ast::Unary { op: UnaryOp::Neg, operand } => -eval(operand, context),
        Ast::Binary { op, left, right } => {
            let l = eval(left, context);
            let r = eval(right, context);
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                // A zero divisor produces a non-finite value, collapsed to
                // the fallback at the Program boundary.
                BinaryOp::Div => l / r,
            }
        }
        Ast::Call { func, args } => apply(*func, args, context),
    }
}

fn apply(func: Function, args: &[Ast], context: &HashMap<String, f64>) -> f64 {
    match func {
        Function::Min => args.iter().map(|a| eval(a, context)).fold(f64::INFINITY, f64::min),
        Function::Max => args.iter().map(|a| eval(a, context)).fold(f64::NEG_INFINITY, f64::max),
        _ => {
            // Arity was checked at parse time.
            let x = args.first().map(|a| eval(a, context)).unwrap_or(0.0);
            match func {
                Function::Log => x.log10(),
                Function::Ln => x.ln(),
                Function::Exp => x.exp(),
                Function::Sqrt => x.sqrt(),
                Function::Sin => x.sin(),
                Function::Cos => x.cos(),
                Function::Tan => x.tan(),
                Function::Min | Function::Max => unreachable!(),
            }
        }
    }
}
