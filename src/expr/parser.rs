//! Pratt parser (precedence climbing) for the arithmetic grammar.

use super::lexer::Token;
use super::ExprError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// The fixed allow-list of pure functions callable from formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Min,
    Max,
    /// Base-10 logarithm.
    Log,
    /// Natural logarithm.
    Ln,
    Exp,
    Sqrt,
    Sin,
    Cos,
    Tan,
}

impl Function {
    /// Allow-listed names; also filtered out of symbol extraction.
    pub const NAMES: [&'static str; 9] =
        ["min", "max", "log", "ln", "exp", "sqrt", "sin", "cos", "tan"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "log" => Some(Self::Log),
            "ln" => Some(Self::Ln),
            "exp" => Some(Self::Exp),
            "sqrt" => Some(Self::Sqrt),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            _ => None,
        }
    }

    /// min/max are variadic; everything else takes exactly one argument.
    fn accepts_arity(self, n: usize) -> bool {
        match self {
            Self::Min | Self::Max => n >= 1,
            _ => n == 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Ast {
    Number(f64),
    Symbol(String),
    Unary { op: UnaryOp, operand: Box<Ast> },
    Binary { op: BinaryOp, left: Box<Ast>, right: Box<Ast> },
    Call { func: Function, args: Vec<Ast> },
}

struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExprError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            other => Err(ExprError::Parse(format!("expected {expected:?}, found {other:?}"))),
        }
    }
}

/// Binary operator metadata: (precedence, op). Higher binds tighter; all
/// four operators are left-associative.
fn binary_op_info(token: &Token) -> Option<(u8, BinaryOp)> {
    match token {
        Token::Plus => Some((40, BinaryOp::Add)),
        Token::Minus => Some((40, BinaryOp::Sub)),
        Token::Star => Some((50, BinaryOp::Mul)),
        Token::Slash => Some((50, BinaryOp::Div)),
        _ => None,
    }
}

pub(super) fn parse(tokens: &[Token]) -> Result<Ast, ExprError> {
    let mut stream = TokenStream { tokens, pos: 0 };
    let ast = parse_pratt(&mut stream, 0)?;
    match stream.peek() {
        None => Ok(ast),
        Some(token) => Err(ExprError::Parse(format!("unexpected trailing token {token:?}"))),
    }
}

fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<Ast, ExprError> {
    let mut left = parse_prefix(stream)?;

    while let Some(token) = stream.peek() {
        match binary_op_info(token) {
            Some((prec, op)) if prec >= min_prec => {
                stream.advance();
                let right = parse_pratt(stream, prec + 1)?;
                left = Ast::Binary { op, left: Box::new(left), right: Box::new(right) };
            }
            _ => break,
        }
    }

    Ok(left)
}

fn parse_prefix(stream: &mut TokenStream) -> Result<Ast, ExprError> {
    if matches!(stream.peek(), Some(Token::Minus)) {
        stream.advance();
        let operand = parse_prefix(stream)?;
        return Ok(Ast::Unary { op: UnaryOp::Neg, operand: Box::new(operand) });
    }
    parse_atom(stream)
}

fn parse_atom(stream: &mut TokenStream) -> Result<Ast, ExprError> {
    match stream.advance() {
        Some(Token::Number(n)) => Ok(Ast::Number(*n)),
        Some(Token::Ident(name)) => {
            if matches!(stream.peek(), Some(Token::LParen)) {
                let func = Function::from_name(name).ok_or_else(|| {
                    ExprError::UnsupportedExpression(format!("unknown function '{name}'"))
                })?;
                let args = parse_call_args(stream)?;
                if !func.accepts_arity(args.len()) {
                    return Err(ExprError::UnsupportedExpression(format!(
                        "'{name}' does not take {} argument(s)",
                        args.len()
                    )));
                }
                Ok(Ast::Call { func, args })
            } else {
                Ok(Ast::Symbol(name.clone()))
            }
        }
        Some(Token::LParen) => {
            let inner = parse_pratt(stream, 0)?;
            stream.expect(&Token::RParen)?;
            Ok(inner)
        }
        other => Err(ExprError::Parse(format!("unexpected token {other:?}"))),
    }
}

fn parse_call_args(stream: &mut TokenStream) -> Result<Vec<Ast>, ExprError> {
    stream.expect(&Token::LParen)?;
    let mut args = Vec::new();
    while !matches!(stream.peek(), Some(Token::RParen)) {
        args.push(parse_pratt(stream, 0)?);
        if !matches!(stream.peek(), Some(Token::RParen)) {
            stream.expect(&Token::Comma)?;
        }
    }
    stream.expect(&Token::RParen)?;
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(src: &str) -> Result<Ast, ExprError> {
        parse(&tokenize(src).unwrap())
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let ast = parse_str("1 + 2 * 3").unwrap();
        match ast {
            Ast::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Ast::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn subtraction_is_left_associative() {
        // (10 - 4) - 3, not 10 - (4 - 3)
        let ast = parse_str("10 - 4 - 3").unwrap();
        match ast {
            Ast::Binary { op: BinaryOp::Sub, left, .. } => {
                assert!(matches!(*left, Ast::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn double_negation_nests() {
        let ast = parse_str("--3").unwrap();
        assert!(matches!(ast, Ast::Unary { operand, .. } if matches!(*operand, Ast::Unary { .. })));
    }

    #[test]
    fn call_requires_known_function() {
        assert!(matches!(parse_str("foo(1)"), Err(ExprError::UnsupportedExpression(_))));
        assert!(parse_str("min(1, 2, 3)").is_ok());
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(parse_str(""), Err(ExprError::Parse(_))));
    }
}
