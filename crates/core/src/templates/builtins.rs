//! Built-in operators.
//!
//! Every built-in receives the invocation (variable store, metadata and the
//! run's random source) and its arguments, and returns the replacement text.
//! Updates to the variable store happen in place on the invocation.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Local;
use rand::Rng;

use super::MacroError;
use super::calc;
use super::engine::Invocation;

/// Largest text `FOR` may produce, in bytes.
pub const MAX_REPEAT_BYTES: usize = 1 << 24;

pub type Builtin = fn(&mut Invocation<'_>, &[String]) -> Result<String, MacroError>;

/// The built-in table, keyed by operator name.
#[must_use]
pub fn registry() -> HashMap<&'static str, Builtin> {
    let table: [(&'static str, Builtin); 16] = [
        ("SAVE", op_save),
        ("VAR", op_var),
        ("VARINT", op_varint),
        ("VARFLOAT", op_varfloat),
        ("INT", op_int),
        ("FLOAT", op_float),
        ("FLOATRANGE", op_floatrange),
        ("OP", op_op),
        ("OPEXCEPT", op_opexcept),
        ("DATE", op_date),
        ("FOR", op_for),
        ("CASES", op_cases),
        ("ID", op_id),
        ("QUOTECOMMA", op_quotecomma),
        ("CALC", op_calc),
        ("QUOTE", op_quote),
    ];
    table.into_iter().collect()
}

fn arity(name: &str, expected: &str, got: usize) -> MacroError {
    MacroError::Arity { name: name.to_string(), expected: expected.to_string(), got }
}

fn number<T: FromStr>(name: &str, value: &str) -> Result<T, MacroError> {
    value.trim().parse().map_err(|_| MacroError::BadNumber {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn op_save(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let [name, key, rest @ ..] = args else {
        return Err(arity("SAVE", "at least 2", args.len()));
    };
    let value = call.call(key, rest)?;
    call.state.vars.insert(name.clone(), value);
    Ok(String::new())
}

fn op_var(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let [name, _, ..] = args else {
        return Err(arity("VAR", "at least 2", args.len()));
    };
    op_save(call, args)?;
    Ok(format!("(({name}))"))
}

fn op_var_with(
    call: &mut Invocation<'_>,
    op: &str,
    args: &[String],
) -> Result<String, MacroError> {
    let [name, rest @ ..] = args else {
        return Err(arity(&format!("VAR{op}"), "at least 1", 0));
    };
    let mut full = vec![name.clone(), op.to_string()];
    full.extend_from_slice(rest);
    op_var(call, &full)
}

fn op_varint(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    op_var_with(call, "INT", args)
}

fn op_varfloat(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    op_var_with(call, "FLOAT", args)
}

fn op_int(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let (min, max, step) = match args {
        [min, max] => (number::<i64>("INT", min)?, number::<i64>("INT", max)?, 1),
        [min, max, step] => {
            (number::<i64>("INT", min)?, number::<i64>("INT", max)?, number::<i64>("INT", step)?)
        }
        _ => return Err(arity("INT", "2 or 3", args.len())),
    };
    if step <= 0 {
        return Err(MacroError::BadNumber { name: "INT".into(), value: step.to_string() });
    }
    if max < min {
        return Err(MacroError::EmptyChoice("INT".into()));
    }
    let count = max.checked_sub(min).and_then(|span| span.checked_div(step)).ok_or_else(|| {
        MacroError::BadNumber { name: "INT".into(), value: format!("{min}..{max}") }
    })?;
    let k = call.rng.gen_range(0..=count);
    Ok((min + k * step).to_string())
}

fn op_float(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let (min, max, decimals) = match args {
        [min, max] => (number::<f64>("FLOAT", min)?, number::<f64>("FLOAT", max)?, 2),
        [min, max, decimals] => (
            number::<f64>("FLOAT", min)?,
            number::<f64>("FLOAT", max)?,
            number::<usize>("FLOAT", decimals)?,
        ),
        _ => return Err(arity("FLOAT", "2 or 3", args.len())),
    };
    if let Some(bad) = [min, max].into_iter().find(|v| !v.is_finite()) {
        return Err(MacroError::BadNumber { name: "FLOAT".into(), value: bad.to_string() });
    }
    if max < min {
        return Err(MacroError::EmptyChoice("FLOAT".into()));
    }
    if !(max - min).is_finite() {
        return Err(MacroError::BadNumber { name: "FLOAT".into(), value: format!("{min}..{max}") });
    }
    let value = if max > min { call.rng.gen_range(min..max) } else { min };
    Ok(format!("{value:.decimals$}"))
}

fn op_floatrange(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let (min, max, step, decimals) = match args {
        [min, max, step] => (min, max, step, fraction_digits(step)),
        [min, max, step, decimals] => {
            (min, max, step, number::<usize>("FLOATRANGE", decimals)?)
        }
        _ => return Err(arity("FLOATRANGE", "3 or 4", args.len())),
    };
    let min = number::<f64>("FLOATRANGE", min)?;
    let max = number::<f64>("FLOATRANGE", max)?;
    let step_value = number::<f64>("FLOATRANGE", step)?;
    if let Some(bad) = [min, max].into_iter().find(|v| !v.is_finite()) {
        return Err(MacroError::BadNumber { name: "FLOATRANGE".into(), value: bad.to_string() });
    }
    if !step_value.is_finite() || step_value <= 0.0 {
        return Err(MacroError::BadNumber { name: "FLOATRANGE".into(), value: step.clone() });
    }

    let count = ((max - min) / step_value - 1e-9).ceil().max(0.0) as usize;
    if count == 0 {
        return Err(MacroError::EmptyChoice("FLOATRANGE".into()));
    }
    let k = call.rng.gen_range(0..count);
    let value = min + k as f64 * step_value;
    Ok(format!("{value:.decimals$}"))
}

/// Digits after the decimal point of a number as written.
fn fraction_digits(text: &str) -> usize {
    text.trim().split_once('.').map_or(0, |(_, frac)| frac.len())
}

fn op_op(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    if args.is_empty() {
        return Err(MacroError::EmptyChoice("OP".into()));
    }
    Ok(args[call.rng.gen_range(0..args.len())].clone())
}

fn op_opexcept(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let [count, rest @ ..] = args else {
        return Err(arity("OPEXCEPT", "at least 1", 0));
    };
    let count = number::<usize>("OPEXCEPT", count)?;
    if rest.len() < count {
        return Err(arity("OPEXCEPT", &format!("at least {}", count + 1), args.len()));
    }
    let (excluded, values) = rest.split_at(count);
    let candidates: Vec<&String> = values.iter().filter(|v| !excluded.contains(v)).collect();
    if candidates.is_empty() {
        return Err(MacroError::EmptyChoice("OPEXCEPT".into()));
    }
    Ok(candidates[call.rng.gen_range(0..candidates.len())].clone())
}

fn op_date(_call: &mut Invocation<'_>, _args: &[String]) -> Result<String, MacroError> {
    Ok(Local::now().format("%Y-%m-%d").to_string())
}

fn op_for(_call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let [text, times] = args else {
        return Err(arity("FOR", "2", args.len()));
    };
    let count = number::<i64>("FOR", times)?;
    let Ok(n) = usize::try_from(count) else {
        return Ok(String::new());
    };
    match text.len().checked_mul(n) {
        Some(bytes) if bytes <= MAX_REPEAT_BYTES => Ok(text.repeat(n)),
        _ => Err(MacroError::BadNumber { name: "FOR".into(), value: times.clone() }),
    }
}

fn op_cases(_call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    let [input, cases @ ..] = args else {
        return Err(arity("CASES", "at least 1", 0));
    };
    let input = unquote(input);
    for case in cases.chunks(2) {
        match case {
            [matcher, value] if unquote(matcher) == input => return Ok(value.clone()),
            [default] => return Ok(default.clone()),
            _ => {}
        }
    }
    Ok(String::new())
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('"').and_then(|t| t.strip_suffix('"')).unwrap_or(text)
}

fn op_id(_call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    match args {
        [value] => Ok(value.clone()),
        _ => Err(arity("ID", "1", args.len())),
    }
}

fn op_quotecomma(_call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    Ok(args.join("\\,"))
}

fn op_calc(call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    Ok(calc::evaluate(args, call.state)?.to_string())
}

fn op_quote(_call: &mut Invocation<'_>, args: &[String]) -> Result<String, MacroError> {
    match args {
        [name] => Ok(format!("t((COUNTER))_{name}")),
        _ => Err(arity("QUOTE", "1", args.len())),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::MacroTable;
    use crate::templates::{Engine, RenderState};
    use rand::rngs::mock::StepRng;

    fn expand(text: &str) -> Result<String, MacroError> {
        let engine = Engine::new(MacroTable::new());
        engine.expand(text, &mut RenderState::default(), &mut StepRng::new(0, 0))
    }

    fn bad_number(result: Result<String, MacroError>, op: &str) {
        match result {
            Err(MacroError::BadNumber { name, .. }) => assert_eq!(name, op),
            other => panic!("expected BadNumber from {op}, got {other:?}"),
        }
    }

    #[test]
    fn int_rejects_a_span_wider_than_i64() {
        bad_number(expand("((INT,-9223372036854775808,9223372036854775807))"), "INT");
        assert_eq!(expand("((INT,-9223372036854775808,-9223372036854775807))").unwrap(), "-9223372036854775808");
    }

    #[test]
    fn float_rejects_non_finite_bounds() {
        bad_number(expand("((FLOAT,0,inf))"), "FLOAT");
        bad_number(expand("((FLOAT,-inf,0))"), "FLOAT");
        bad_number(expand("((FLOAT,NaN,1))"), "FLOAT");
        bad_number(expand("((FLOAT,-1e308,1e308))"), "FLOAT");
        bad_number(expand("((FLOATRANGE,0,inf,0.5))"), "FLOATRANGE");
        bad_number(expand("((FLOATRANGE,0,1,inf))"), "FLOATRANGE");
    }

    #[test]
    fn for_refuses_oversized_output() {
        bad_number(expand("((FOR,ab,9223372036854775807))"), "FOR");
        bad_number(expand(&format!("((FOR,x,{}))", MAX_REPEAT_BYTES + 1)), "FOR");
        assert_eq!(expand("((FOR,x,0))").unwrap(), "");
    }

    #[test]
    fn registry_knows_every_operator() {
        let table = registry();
        for name in ["SAVE", "VAR", "VARINT", "VARFLOAT", "CALC", "QUOTE"] {
            assert!(table.contains_key(name), "{name}");
        }
        assert_eq!(table.len(), 16);
    }
}
