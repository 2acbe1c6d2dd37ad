//! The `CALC` reverse-polish calculator.

use std::fmt;

use super::MacroError;
use super::engine::RenderState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{x:.1}")
            }
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Evaluate a token list.
///
/// Tokens are looked up as metadata keys, then variables, then operators
/// (`INT`, `ROUND`, `+`, `-`, `*`, `/`); anything else must be a number.
pub fn evaluate(tokens: &[String], state: &RenderState) -> Result<Number, MacroError> {
    let mut stack: Vec<Number> = Vec::new();
    let pop = |stack: &mut Vec<Number>, token: &str| {
        stack.pop().ok_or_else(|| MacroError::Calc(format!("stack underflow at '{token}'")))
    };

    for raw in tokens {
        let token = raw.trim();
        if let Some(value) = state.metadata.get(token).or_else(|| state.vars.get(token)) {
            stack.push(Number::Float(parse_number(value)?));
            continue;
        }
        match token {
            "INT" => {
                let value = pop(&mut stack, token)?;
                let truncated = match value {
                    Number::Int(i) => i,
                    Number::Float(f) => f.trunc() as i64,
                };
                stack.push(Number::Int(truncated));
            }
            "ROUND" => {
                let decimals = pop(&mut stack, token)?.as_f64();
                let value = pop(&mut stack, token)?.as_f64();
                if decimals < 0.0 || decimals.fract() != 0.0 {
                    return Err(MacroError::Calc(format!("ROUND needs whole decimals, got {decimals}")));
                }
                let scale = 10f64.powf(decimals);
                stack.push(Number::Float((value * scale).round() / scale));
            }
            "+" | "-" | "*" | "/" => {
                let right = pop(&mut stack, token)?;
                let left = pop(&mut stack, token)?;
                stack.push(apply(token, left, right)?);
            }
            _ => stack.push(Number::Float(parse_number(token)?)),
        }
    }

    match stack.as_slice() {
        [result] => Ok(*result),
        _ => Err(MacroError::Calc(format!("{} values left on the stack", stack.len()))),
    }
}

fn apply(op: &str, left: Number, right: Number) -> Result<Number, MacroError> {
    if let (Number::Int(a), Number::Int(b)) = (left, right) {
        let checked = match op {
            "+" => a.checked_add(b),
            "-" => a.checked_sub(b),
            "*" => a.checked_mul(b),
            _ => None,
        };
        if let Some(result) = checked {
            return Ok(Number::Int(result));
        }
    }

    let (a, b) = (left.as_f64(), right.as_f64());
    let result = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        _ => {
            if b == 0.0 {
                return Err(MacroError::Calc("division by zero".into()));
            }
            a / b
        }
    };
    Ok(Number::Float(result))
}

fn parse_number(text: &str) -> Result<f64, MacroError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| MacroError::Calc(format!("'{text}' is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(tokens: &[&str], state: &RenderState) -> Result<String, MacroError> {
        let tokens: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
        evaluate(&tokens, state).map(|n| n.to_string())
    }

    #[test]
    fn floats_and_ints_display_differently() {
        let state = RenderState::default();
        assert_eq!(calc(&["3", "4", "+"], &state).unwrap(), "7.0");
        assert_eq!(calc(&["3", "4", "+", "INT"], &state).unwrap(), "7");
        assert_eq!(calc(&["7", "2", "/"], &state).unwrap(), "3.5");
        assert_eq!(calc(&["10", "INT", "4", "INT", "-"], &state).unwrap(), "6");
    }

    #[test]
    fn round_pops_decimals_then_value() {
        let state = RenderState::default();
        assert_eq!(calc(&["3.14159", "2", "ROUND"], &state).unwrap(), "3.14");
    }

    #[test]
    fn reads_metadata_and_variables() {
        let mut state = RenderState::default();
        state.metadata.insert("difficulty".into(), "2".into());
        state.vars.insert("x".into(), "1.5".into());
        assert_eq!(calc(&["difficulty", "x", "*"], &state).unwrap(), "3.0");
    }

    #[test]
    fn misuse_is_an_error() {
        let state = RenderState::default();
        assert!(calc(&["+"], &state).is_err());
        assert!(calc(&["1", "2"], &state).is_err());
        assert!(calc(&["abc"], &state).is_err());
        assert!(calc(&["1", "0", "/"], &state).is_err());
    }
}
