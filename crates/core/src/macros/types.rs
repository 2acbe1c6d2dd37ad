//! User macro definitions from the exam index.

use std::collections::HashMap;

use serde_yaml::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacroDefError {
    #[error("invalid macro key '{0}': expected NAME or ((NAME,param,...))")]
    BadKey(String),

    #[error("macro '{0}' must have a scalar body")]
    BadBody(String),

    #[error("macros must be a mapping or a list of single-key mappings")]
    BadShape,

    #[error("macro '{name}' expects {expected} arguments, got {got}")]
    Arity { name: String, expected: usize, got: usize },
}

/// A user macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroDefinition {
    /// `((NAME))` expands to a literal and ignores its arguments.
    Constant { name: String, value: String },
    /// `((NAME,a,b))` substitutes each parameter occurrence in the body.
    Parametric { name: String, params: Vec<String>, body: String },
}

impl MacroDefinition {
    /// Parse a macro from its index key (`NAME`, `((NAME))` or
    /// `((NAME,param,...))`) and body.
    pub fn parse(key: &str, body: impl Into<String>) -> Result<Self, MacroDefError> {
        let trimmed = key.trim();
        let inner = match trimmed.strip_prefix("((") {
            Some(rest) => {
                rest.strip_suffix("))").ok_or_else(|| MacroDefError::BadKey(key.to_string()))?
            }
            None => trimmed,
        };

        let mut parts = inner.split(',').map(str::trim);
        let name = parts.next().unwrap_or_default().to_string();
        let params: Vec<String> = parts.map(ToOwned::to_owned).collect();
        if name.is_empty() || name.contains(['(', ')']) || params.iter().any(String::is_empty) {
            return Err(MacroDefError::BadKey(key.to_string()));
        }

        let body = body.into();
        if params.is_empty() {
            Ok(MacroDefinition::Constant { name, value: body })
        } else {
            Ok(MacroDefinition::Parametric { name, params, body })
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MacroDefinition::Constant { name, .. } | MacroDefinition::Parametric { name, .. } => {
                name
            }
        }
    }

    /// Expand the macro for one invocation.
    ///
    /// Parameters are substituted one after another in declaration order.
    pub fn apply(&self, args: &[String]) -> Result<String, MacroDefError> {
        match self {
            MacroDefinition::Constant { value, .. } => Ok(value.clone()),
            MacroDefinition::Parametric { name, params, body } => {
                if params.len() != args.len() {
                    return Err(MacroDefError::Arity {
                        name: name.clone(),
                        expected: params.len(),
                        got: args.len(),
                    });
                }
                Ok(params
                    .iter()
                    .zip(args)
                    .fold(body.clone(), |acc, (param, arg)| acc.replace(param.as_str(), arg)))
            }
        }
    }
}

/// Macros by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    macros: HashMap<String, MacroDefinition>,
}

impl MacroTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `macros` entry of an index file.
    ///
    /// Accepts a mapping or a list of single-key mappings; later definitions
    /// of the same name win.
    pub fn from_value(value: &Value) -> Result<Self, MacroDefError> {
        let mut table = Self::new();
        match value {
            Value::Null => {}
            Value::Mapping(map) => {
                for (k, v) in map {
                    table.insert(parse_entry(k, v)?);
                }
            }
            Value::Sequence(items) => {
                for item in items {
                    let Value::Mapping(map) = item else {
                        return Err(MacroDefError::BadShape);
                    };
                    for (k, v) in map {
                        table.insert(parse_entry(k, v)?);
                    }
                }
            }
            _ => return Err(MacroDefError::BadShape),
        }
        Ok(table)
    }

    pub fn insert(&mut self, def: MacroDefinition) {
        self.macros.insert(def.name().to_string(), def);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Macro names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn parse_entry(key: &Value, body: &Value) -> Result<MacroDefinition, MacroDefError> {
    let Value::String(key) = key else {
        return Err(MacroDefError::BadKey(format!("{key:?}")));
    };
    let body = match body {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => return Err(MacroDefError::BadBody(key.clone())),
    };
    MacroDefinition::parse(key, body)
}
