//! Expression evaluation for the `p` command
//!
//! A deliberately small language: identifiers, numeric and string
//! literals, unary minus, `+ - * /`, parentheses, and top-level comma
//! tuples. Names resolve through the frame's two-tier [`Scope`];
//! everything else is a recoverable [`EvalError`] rendered inline by the
//! session.

use crate::error::EvalError;
use crate::scope::Scope;
use crate::value::{Array, Value};

// ── Tokens ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(_, c)) = chars.peek() {
        match c {
            ' ' | '\t' => {
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
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, ch)) if ch == quote => break,
                        Some((_, ch)) => s.push(ch),
                        None => return Err(EvalError::syntax("unterminated string literal")),
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                let mut is_float = false;
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_ascii_digit() {
                        text.push(ch);
                        chars.next();
                    } else if ch == '.' && !is_float {
                        is_float = true;
                        text.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if is_float {
                    let v = text
                        .parse::<f64>()
                        .map_err(|_| EvalError::syntax("invalid syntax"))?;
                    tokens.push(Token::Float(v));
                } else {
                    let v = text
                        .parse::<i64>()
                        .map_err(|_| EvalError::syntax("invalid syntax"))?;
                    tokens.push(Token::Int(v));
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        name.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            _ => return Err(EvalError::syntax("invalid syntax")),
        }
    }
    Ok(tokens)
}

// ── Parser / evaluator ───────────────────────────────────────────────────────

/// Evaluate `input` against `scope`.
///
/// A top-level comma produces a tuple, matching the `p a, b` rendering.
pub fn evaluate(input: &str, scope: Scope<'_>) -> Result<Value, EvalError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::syntax("invalid syntax"));
    }
    let mut parser = Evaluator {
        tokens,
        pos: 0,
        scope,
    };
    let value = parser.expr_list()?;
    if parser.pos != parser.tokens.len() {
        return Err(EvalError::syntax("invalid syntax"));
    }
    Ok(value)
}

struct Evaluator<'a> {
    tokens: Vec<Token>,
    pos: usize,
    scope: Scope<'a>,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr_list(&mut self) -> Result<Value, EvalError> {
        let first = self.expr()?;
        if self.peek() != Some(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            items.push(self.expr()?);
        }
        Ok(Value::Tuple(items))
    }

    fn expr(&mut self) -> Result<Value, EvalError> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                let rhs = self.term()?;
                lhs = binary_add(&lhs, &rhs)?;
            } else if self.eat(&Token::Minus) {
                let rhs = self.term()?;
                lhs = binary_numeric(&lhs, &rhs, "-", Array::sub)?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn term(&mut self) -> Result<Value, EvalError> {
        let mut lhs = self.factor()?;
        loop {
            if self.eat(&Token::Star) {
                let rhs = self.factor()?;
                lhs = binary_numeric(&lhs, &rhs, "*", Array::mul)?;
            } else if self.eat(&Token::Slash) {
                let rhs = self.factor()?;
                lhs = binary_numeric(&lhs, &rhs, "/", Array::div)?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn factor(&mut self) -> Result<Value, EvalError> {
        if self.eat(&Token::Minus) {
            let v = self.factor()?;
            return match v {
                Value::Array(a) => Ok(Value::Array(a.neg())),
                other => Err(EvalError::type_error(format!(
                    "bad operand type for unary -: '{}'",
                    type_name(&other)
                ))),
            };
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Value, EvalError> {
        match self.bump() {
            Some(Token::Ident(name)) => self
                .scope
                .resolve(&name)
                .cloned()
                .ok_or_else(|| EvalError::name(&name)),
            Some(Token::Int(v)) => Ok(Value::Array(Array::scalar_i32(v))),
            Some(Token::Float(v)) => Ok(Value::Array(Array::scalar_f32(v))),
            Some(Token::Str(s)) => Ok(Value::str(s)),
            Some(Token::LParen) => {
                let v = self.expr_list()?;
                if self.eat(&Token::RParen) {
                    Ok(v)
                } else {
                    Err(EvalError::syntax("invalid syntax"))
                }
            }
            _ => Err(EvalError::syntax("invalid syntax")),
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Array(_) => "array",
        Value::Str(_) => "str",
        Value::Tuple(_) => "tuple",
    }
}

fn unsupported_operand(op: &str, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::type_error(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        type_name(lhs),
        type_name(rhs)
    ))
}

fn binary_add(lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
        _ => binary_numeric(lhs, rhs, "+", Array::add),
    }
}

fn binary_numeric(
    lhs: &Value,
    rhs: &Value,
    op: &str,
    f: impl Fn(&Array, &Array) -> Result<Array, crate::error::ExecError>,
) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Array(a), Value::Array(b)) => f(a, b)
            .map(Value::Array)
            .map_err(|e| EvalError::type_error(e.to_string())),
        _ => Err(unsupported_operand(op, lhs, rhs)),
    }
}
