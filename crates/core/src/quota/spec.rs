//! The quota specification as written in the index file.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use super::QuotaError;

static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)-(\d+|\*)$").unwrap());

/// Upper bound of a count range before it is resolved against a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Finite(usize),
    /// "As many as available"; must be resolved before summing or taking.
    Unbounded,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Finite(n) => write!(f, "{n}"),
            Bound::Unbounded => f.write_str("*"),
        }
    }
}

/// One position of a quota specification.
///
/// Parsed once from YAML; strings are classified into count ranges or tag
/// queries at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum QuotaSpec {
    IntLiteral(i64),
    RangeText(String),
    TagText(String),
    Sequence(Vec<QuotaSpec>),
    SingleKeyMap(Box<QuotaSpec>, Box<QuotaSpec>),
    MultiKeyMap(Vec<(QuotaSpec, QuotaSpec)>),
}

impl QuotaSpec {
    pub fn from_value(value: &Value) -> Result<Self, QuotaError> {
        let invalid = |reason: &str| QuotaError::InvalidSpec {
            lemma: describe(value),
            reason: reason.to_string(),
        };

        match value {
            Value::Number(n) => n
                .as_i64()
                .map(QuotaSpec::IntLiteral)
                .ok_or_else(|| invalid("counts must be integers")),
            Value::String(s) => {
                let text = s.trim();
                if text.is_empty() {
                    Err(invalid("empty text"))
                } else if is_range_text(text) {
                    Ok(QuotaSpec::RangeText(text.to_string()))
                } else {
                    Ok(QuotaSpec::TagText(text.to_string()))
                }
            }
            Value::Sequence(items) => {
                if items.is_empty() {
                    return Err(invalid("empty list"));
                }
                let items = items.iter().map(Self::from_value).collect::<Result<Vec<_>, _>>()?;
                Ok(QuotaSpec::Sequence(items))
            }
            Value::Mapping(map) => {
                let mut pairs = map
                    .iter()
                    .map(|(k, v)| Ok((Self::from_value(k)?, Self::from_value(v)?)))
                    .collect::<Result<Vec<_>, QuotaError>>()?;
                match pairs.len() {
                    0 => Err(invalid("empty mapping")),
                    1 => {
                        let (k, v) = pairs.remove(0);
                        Ok(QuotaSpec::SingleKeyMap(Box::new(k), Box::new(v)))
                    }
                    _ => Ok(QuotaSpec::MultiKeyMap(pairs)),
                }
            }
            Value::Null => Err(invalid("null is not a quota")),
            Value::Bool(_) => Err(invalid("booleans are not quotas")),
            Value::Tagged(_) => Err(invalid("tagged values are not quotas")),
        }
    }

    /// Parse a quota from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, QuotaError> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| QuotaError::InvalidSpec {
            lemma: text.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_value(&value)
    }
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{value:?}"))
}

fn is_range_text(text: &str) -> bool {
    matches!(text, "*" | "+" | "?") || INT_RE.is_match(text) || RANGE_RE.is_match(text)
}

/// Count range denoted by an integer literal.
///
/// Negative integers mean "any number".
#[must_use]
pub fn int_range(n: i64) -> (usize, Bound) {
    match usize::try_from(n) {
        Ok(n) => (n, Bound::Finite(n)),
        Err(_) => (0, Bound::Unbounded),
    }
}

/// Count range denoted by a range text (`*`, `+`, `?`, `N`, `a-b`, `a-*`).
pub fn parse_range(text: &str) -> Result<(usize, Bound), QuotaError> {
    let invalid = || QuotaError::InvalidSpec {
        lemma: text.to_string(),
        reason: "not a count range".to_string(),
    };

    match text.trim() {
        "*" => return Ok((0, Bound::Unbounded)),
        "+" => return Ok((1, Bound::Unbounded)),
        "?" => return Ok((0, Bound::Finite(1))),
        _ => {}
    }

    let text = text.trim();
    if INT_RE.is_match(text) {
        let n: i64 = text.parse().map_err(|_| invalid())?;
        return Ok(int_range(n));
    }

    let caps = RANGE_RE.captures(text).ok_or_else(invalid)?;
    let min: usize = caps[1].parse().map_err(|_| invalid())?;
    if &caps[2] == "*" {
        return Ok((min, Bound::Unbounded));
    }
    let max: usize = caps[2].parse().map_err(|_| invalid())?;
    if max < min {
        return Err(QuotaError::EmptyRange { lemma: text.to_string(), min, max });
    }
    Ok((min, Bound::Finite(max)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scalars() {
        assert_eq!(QuotaSpec::from_yaml("3").unwrap(), QuotaSpec::IntLiteral(3));
        assert_eq!(QuotaSpec::from_yaml("'2-*'").unwrap(), QuotaSpec::RangeText("2-*".into()));
        assert_eq!(QuotaSpec::from_yaml("'+'").unwrap(), QuotaSpec::RangeText("+".into()));
        assert_eq!(
            QuotaSpec::from_yaml("algebra linear &").unwrap(),
            QuotaSpec::TagText("algebra linear &".into())
        );
    }

    #[test]
    fn classifies_containers() {
        let spec = QuotaSpec::from_yaml("{a: 1}").unwrap();
        assert!(matches!(spec, QuotaSpec::SingleKeyMap(..)));

        let spec = QuotaSpec::from_yaml("{a: 1, b: '?'}").unwrap();
        let QuotaSpec::MultiKeyMap(pairs) = spec else { panic!("expected multi-key map") };
        assert_eq!(pairs[0].0, QuotaSpec::TagText("a".into()));
        assert_eq!(pairs[1].1, QuotaSpec::RangeText("?".into()));

        let spec = QuotaSpec::from_yaml("[intro, 2]").unwrap();
        assert_eq!(
            spec,
            QuotaSpec::Sequence(vec![QuotaSpec::TagText("intro".into()), QuotaSpec::IntLiteral(2)])
        );
    }

    #[test]
    fn rejects_non_quota_values() {
        for text in ["~", "true", "1.5", "[]", "{}", "''"] {
            assert!(
                matches!(QuotaSpec::from_yaml(text), Err(QuotaError::InvalidSpec { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn range_texts() {
        assert_eq!(parse_range("*").unwrap(), (0, Bound::Unbounded));
        assert_eq!(parse_range("+").unwrap(), (1, Bound::Unbounded));
        assert_eq!(parse_range("?").unwrap(), (0, Bound::Finite(1)));
        assert_eq!(parse_range("4").unwrap(), (4, Bound::Finite(4)));
        assert_eq!(parse_range("-1").unwrap(), (0, Bound::Unbounded));
        assert_eq!(parse_range("2-5").unwrap(), (2, Bound::Finite(5)));
        assert_eq!(parse_range("2-*").unwrap(), (2, Bound::Unbounded));
        assert!(matches!(parse_range("5-2"), Err(QuotaError::EmptyRange { min: 5, max: 2, .. })));
    }
}
