//! Exam index loading and run-parameter resolution.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::types::{DEFAULT_TOLERANCE, DEFAULT_TRIES, ExamSpec, Overrides, Settings};
use crate::config::DefaultsConfig;
use crate::macros::{MacroDefError, MacroTable};
use crate::question::RESERVED_FIELDS;
use crate::quota::{QuotaError, QuotaSpec};

const KNOWN_FIELDS: &[&str] =
    &["difficulty", "tolerance", "tries", "seed", "bank", "files", "macros", "parts"];

#[derive(Debug, Error)]
pub enum ExamLoadError {
    #[error("exam index not found at {0}")]
    NotFound(String),

    #[error("failed to read exam index {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse YAML in {0}: {1}")]
    ParseError(String, #[source] serde_yaml::Error),

    #[error("exam index {0} is not a mapping")]
    NotAMapping(String),

    #[error("exam index is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("exam index field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("output '{0}' uses a reserved question field as channel id")]
    ReservedChannel(String),

    #[error("output channel '{0}' is declared twice")]
    DuplicateChannel(String),

    #[error("no question bank: set `bank` in the index, the config, or pass --bank")]
    NoBank,

    #[error("{0} already exists, refusing to overwrite it")]
    AlreadyExists(String),

    #[error("failed to write {0}: {1}")]
    WriteError(String, #[source] std::io::Error),

    #[error("invalid macros: {0}")]
    Macros(#[from] MacroDefError),

    #[error("invalid parts: {0}")]
    Parts(#[from] QuotaError),
}

/// Read and validate an exam index file.
pub fn load_exam(index: &Path) -> Result<ExamSpec, ExamLoadError> {
    if !index.exists() {
        return Err(ExamLoadError::NotFound(index.display().to_string()));
    }
    info!(index = %index.display(), "loading exam index");
    let s = fs::read_to_string(index)
        .map_err(|e| ExamLoadError::ReadError(index.display().to_string(), e))?;
    let value: Value = serde_yaml::from_str(&s)
        .map_err(|e| ExamLoadError::ParseError(index.display().to_string(), e))?;
    let Value::Mapping(map) = value else {
        return Err(ExamLoadError::NotAMapping(index.display().to_string()));
    };
    parse_exam(index, &map)
}

/// Build an [`ExamSpec`] from an already parsed index mapping.
pub fn parse_exam(index: &Path, map: &Mapping) -> Result<ExamSpec, ExamLoadError> {
    let get = |key: &str| map.get(key).filter(|v| !v.is_null());
    let invalid = |field: &str, reason: &str| ExamLoadError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let difficulty = get("difficulty")
        .ok_or(ExamLoadError::MissingField("difficulty"))?
        .as_f64()
        .ok_or_else(|| invalid("difficulty", "not a number"))?;

    let tolerance = match get("tolerance") {
        None => None,
        Some(v) => match v.as_f64() {
            Some(t) if t > 0.0 => Some(t),
            _ => return Err(invalid("tolerance", "must be a positive number")),
        },
    };

    let tries = get("tries")
        .map(|v| {
            v.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid("tries", "must be a non-negative integer"))
        })
        .transpose()?;

    let seed = get("seed")
        .map(|v| v.as_u64().ok_or_else(|| invalid("seed", "must be a non-negative integer")))
        .transpose()?;

    let bank = get("bank")
        .map(|v| v.as_str().map(PathBuf::from).ok_or_else(|| invalid("bank", "must be a path")))
        .transpose()?;

    let files = match get("files").ok_or(ExamLoadError::MissingField("files"))? {
        Value::String(s) => vec![s.clone()],
        Value::Sequence(items) => items
            .iter()
            .map(|v| v.as_str().map(ToOwned::to_owned))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| invalid("files", "entries must be file names"))?,
        _ => return Err(invalid("files", "expected a file name or a list of them")),
    };
    if files.is_empty() {
        return Err(invalid("files", "at least one output file is required"));
    }

    let mut channels: Vec<String> = Vec::with_capacity(files.len());
    for file in &files {
        let id = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("files", "entries must be file names"))?
            .to_string();
        if RESERVED_FIELDS.contains(&id.as_str()) {
            return Err(ExamLoadError::ReservedChannel(file.clone()));
        }
        if channels.contains(&id) {
            return Err(ExamLoadError::DuplicateChannel(id));
        }
        channels.push(id);
    }

    let text_of = |key: String| -> Result<String, ExamLoadError> {
        match get(&key) {
            None => Ok(String::new()),
            Some(v) => scalar_text(v).ok_or_else(|| invalid(&key, "must be text")),
        }
    };
    let headers = channels
        .iter()
        .map(|id| text_of(format!("begin_{id}")))
        .collect::<Result<Vec<_>, _>>()?;
    let footers = channels
        .iter()
        .map(|id| text_of(format!("end_{id}")))
        .collect::<Result<Vec<_>, _>>()?;

    let macros = match get("macros") {
        Some(v) => MacroTable::from_value(v)?,
        None => MacroTable::new(),
    };

    let parts = QuotaSpec::from_value(get("parts").ok_or(ExamLoadError::MissingField("parts"))?)?;

    let mut metadata = HashMap::new();
    for (key, value) in map {
        let Some(key) = key.as_str() else { continue };
        if KNOWN_FIELDS.contains(&key) || key.starts_with("begin_") || key.starts_with("end_") {
            continue;
        }
        if let Some(text) = scalar_text(value) {
            metadata.insert(key.to_string(), text);
        }
    }

    debug!(
        channels = ?channels,
        macros = macros.len(),
        metadata = metadata.len(),
        "exam index parsed"
    );

    Ok(ExamSpec {
        index: index.to_path_buf(),
        difficulty,
        tolerance,
        tries,
        seed,
        bank,
        files,
        channels,
        headers,
        footers,
        macros,
        metadata,
        parts,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Seed used when neither the command line nor the index sets one:
/// today's date as `YYYYMMDD`, times ten so editions do not overlap days.
#[must_use]
pub fn default_seed() -> u64 {
    Local::now().format("%Y%m%d").to_string().parse::<u64>().unwrap_or_default() * 10
}

/// Apply command line > index > config > built-in precedence.
///
/// A bank given in the index is relative to the index file.
pub fn resolve_settings(
    exam: &ExamSpec,
    cli: &Overrides,
    config: &DefaultsConfig,
) -> Result<Settings, ExamLoadError> {
    let index_dir = exam.index.parent().unwrap_or_else(|| Path::new(""));
    let bank = cli
        .bank
        .clone()
        .or_else(|| exam.bank.as_ref().map(|b| index_dir.join(b)))
        .or_else(|| config.bank.clone())
        .ok_or(ExamLoadError::NoBank)?;

    let tolerance =
        cli.tolerance.or(exam.tolerance).or(config.tolerance).unwrap_or(DEFAULT_TOLERANCE);
    if tolerance.is_nan() || tolerance <= 0.0 {
        return Err(ExamLoadError::InvalidField {
            field: "tolerance".into(),
            reason: "must be a positive number".into(),
        });
    }

    Ok(Settings {
        bank,
        seed: cli.seed.or(exam.seed).unwrap_or_else(default_seed),
        tries: cli.tries.or(exam.tries).or(config.tries).unwrap_or(DEFAULT_TRIES),
        tolerance,
    })
}
