//! Tokenizer for the restricted arithmetic grammar.

use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(super) fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '0'..='9' | '.' => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // Optional exponent: e / E, optional sign, then digits.
                // Committed only when digits follow, so "2 exp" stays split.
                if let Some(&e @ ('e' | 'E')) = chars.peek() {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    let mut exp = String::from(e);
                    if let Some(&sign @ ('+' | '-')) = lookahead.peek() {
                        exp.push(sign);
                        lookahead.next();
                    }
                    let mut has_digits = false;
                    while let Some(&d) = lookahead.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        exp.push(d);
                        lookahead.next();
                        has_digits = true;
                    }
                    if has_digits {
                        text.push_str(&exp);
                        chars = lookahead;
                    }
                }
                let value: f64 = text
                    .parse()
                    .map_err(|_| ExprError::Parse(format!("invalid number '{text}'")))?;
                tokens.push(Token::Number(value));
            }
            // Identifiers may carry a leading Δ marker ("delta of"), as in
            // the source data's ΔTRUCK_KM style tokens.
            'Δ' => {
                chars.next();
                match chars.peek() {
                    Some(&d) if is_ident_start(d) => {
                        let mut name = String::from('Δ');
                        while let Some(&d) = chars.peek() {
                            if is_ident_continue(d) {
                                name.push(d);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        tokens.push(Token::Ident(name));
                    }
                    _ => return Err(ExprError::Parse("dangling 'Δ' marker".to_string())),
                }
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                while let Some(&d) = chars.peek() {
                    if is_ident_continue(d) {
                        name.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => {
                return Err(ExprError::Parse(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}
