//! Question bank loading from YAML files.
//!
//! A bank is a file or a directory tree of `.yaml`/`.yml` files. Each file
//! may contain several YAML documents, one question per document.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::types::{ALL_TAG, Question, QuestionOrigin, RESERVED_FIELDS};

#[derive(Debug, Error)]
pub enum QuestionLoadError {
    #[error("question bank does not exist: {0}")]
    MissingBank(String),

    #[error("failed to walk question bank {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),

    #[error("failed to read question file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path} (document {document}): question is not a mapping")]
    NotAMapping { path: PathBuf, document: usize },

    #[error("{path} (document {document}): missing required field '{field}'")]
    MissingField { path: PathBuf, document: usize, field: String },

    #[error("{path} (document {document}): invalid field '{field}': {reason}")]
    InvalidField { path: PathBuf, document: usize, field: String, reason: String },

    #[error(
        "{path} (document {document}): difficulty 0 is the old format, declare `scaffold: true` instead"
    )]
    LegacyZeroDifficulty { path: PathBuf, document: usize },

    #[error("no questions found in {0}")]
    EmptyBank(String),
}

/// Load every question under `root` (a file or a directory).
///
/// Files are visited in file-name order so that a fixed seed always sees the
/// bank in the same order.
pub fn load_questions(root: &Path) -> Result<Vec<Arc<Question>>, QuestionLoadError> {
    if !root.exists() {
        return Err(QuestionLoadError::MissingBank(root.display().to_string()));
    }
    info!(bank = %root.display(), "loading questions");

    let mut questions = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry
            .map_err(|e| QuestionLoadError::WalkError(root.display().to_string(), e))?;
        let path = entry.path();
        if !path.is_file() || !is_question_file(path) {
            continue;
        }
        questions.extend(load_question_file(path)?);
    }

    if questions.is_empty() {
        return Err(QuestionLoadError::EmptyBank(root.display().to_string()));
    }
    info!(count = questions.len(), "questions loaded");
    Ok(questions)
}

/// Load all questions of a single YAML file.
pub fn load_question_file(path: &Path) -> Result<Vec<Arc<Question>>, QuestionLoadError> {
    debug!(file = %path.display(), "loading question file");
    let content = fs::read_to_string(path)
        .map_err(|e| QuestionLoadError::Io { path: path.to_path_buf(), source: e })?;
    parse_questions(&content, path)
}

/// Parse the questions of a YAML string as if read from `path`.
///
/// `path` provides the file stem used for autotagging and default titles.
pub fn parse_questions(
    content: &str,
    path: &Path,
) -> Result<Vec<Arc<Question>>, QuestionLoadError> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();

    let mut questions = Vec::new();
    for (document, de) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(de)
            .map_err(|e| QuestionLoadError::Yaml { path: path.to_path_buf(), source: e })?;
        if value.is_null() {
            continue;
        }
        let origin = QuestionOrigin { path: path.to_path_buf(), document };
        if let Some(question) = normalize(value, &stem, origin)? {
            questions.push(Arc::new(question));
        }
    }
    Ok(questions)
}

fn is_question_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

fn normalize(
    value: Value,
    stem: &str,
    origin: QuestionOrigin,
) -> Result<Option<Question>, QuestionLoadError> {
    let Value::Mapping(map) = value else {
        return Err(QuestionLoadError::NotAMapping {
            path: origin.path,
            document: origin.document,
        });
    };

    let invalid = |field: &str, reason: &str| QuestionLoadError::InvalidField {
        path: origin.path.clone(),
        document: origin.document,
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let mut record: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in map {
        let Some(key) = scalar_to_string(&key) else {
            return Err(invalid("<key>", "field names must be scalars"));
        };
        record.insert(key, value);
    }

    if record.contains_key("ignored") {
        debug!(file = %origin.path.display(), document = origin.document, "question ignored");
        return Ok(None);
    }

    let scaffold = record.get("scaffold").is_some_and(|v| !matches!(v, Value::Bool(false)));

    let difficulty = if scaffold {
        0.0
    } else {
        let value = record.get("difficulty").filter(|v| !v.is_null()).ok_or_else(|| {
            QuestionLoadError::MissingField {
                path: origin.path.clone(),
                document: origin.document,
                field: "difficulty".into(),
            }
        })?;
        let difficulty = value.as_f64().ok_or_else(|| invalid("difficulty", "not a number"))?;
        if difficulty == 0.0 {
            return Err(QuestionLoadError::LegacyZeroDifficulty {
                path: origin.path,
                document: origin.document,
            });
        }
        if !difficulty.is_finite() || difficulty < 0.0 {
            return Err(invalid("difficulty", "must be a non-negative number"));
        }
        difficulty
    };

    let frequency = match record.get("frequency").filter(|v| !v.is_null()) {
        None => 1.0,
        Some(v) => v.as_f64().ok_or_else(|| invalid("frequency", "not a number"))?,
    };
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(invalid("frequency", "must be a positive number"));
    }

    let autotag = if scaffold {
        false
    } else {
        match record.get("autotag") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(invalid("autotag", "must be a boolean")),
        }
    };

    let mut tags = BTreeSet::new();
    match record.get("tags") {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(seq)) => {
            for item in seq {
                let tag = scalar_to_string(item)
                    .ok_or_else(|| invalid("tags", "tags must be scalars"))?;
                tags.insert(tag);
            }
        }
        Some(other) => {
            let tag = scalar_to_string(other)
                .ok_or_else(|| invalid("tags", "expected a tag or a list of tags"))?;
            tags.insert(tag);
        }
    }
    if autotag {
        tags.insert(stem.to_string());
        tags.insert(ALL_TAG.to_string());
    }
    if tags.is_empty() {
        return Err(QuestionLoadError::MissingField {
            path: origin.path,
            document: origin.document,
            field: "tags".into(),
        });
    }

    let mut fields = BTreeMap::new();
    let mut has_text = false;
    for (key, value) in &record {
        if let Value::String(_) = value {
            if !RESERVED_FIELDS.contains(&key.as_str()) {
                has_text = true;
            }
        }
        if let Some(text) = scalar_to_string(value) {
            fields.insert(key.clone(), text);
        }
    }
    if !has_text {
        return Err(QuestionLoadError::MissingField {
            path: origin.path,
            document: origin.document,
            field: "text channel".into(),
        });
    }

    let title = fields
        .get("title")
        .cloned()
        .unwrap_or_else(|| format!("{stem}#{}", origin.document));
    fields.insert("title".into(), title.clone());
    fields.insert("difficulty".into(), difficulty.to_string());
    fields.insert("frequency".into(), frequency.to_string());
    fields.insert("scaffold".into(), scaffold.to_string());
    fields.insert("autotag".into(), autotag.to_string());

    Ok(Some(Question { title, difficulty, frequency, tags, scaffold, autotag, fields, origin }))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
