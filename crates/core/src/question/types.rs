//! Question record types.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Field names with a fixed meaning in a question record.
///
/// They are never treated as text channels and cannot be used as output
/// channel ids.
pub const RESERVED_FIELDS: &[&str] =
    &["scaffold", "difficulty", "autotag", "frequency", "tags", "title", "ignored"];

/// Tag automatically attached to every autotagged question.
pub const ALL_TAG: &str = "all";

/// A single question from the bank.
///
/// Questions are loaded once and shared read-only (behind `Arc`) by every
/// quota leaf and every sampling attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub title: String,
    pub difficulty: f64,
    /// Sampling weight, always positive.
    pub frequency: f64,
    pub tags: BTreeSet<String>,
    /// Scaffold questions are rendered but do not advance the counter.
    pub scaffold: bool,
    pub autotag: bool,
    /// Every scalar field of the source record, stringified.
    ///
    /// Text channels live here too, keyed by channel id.
    pub fields: BTreeMap<String, String>,
    pub origin: QuestionOrigin,
}

/// Where a question was loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionOrigin {
    pub path: PathBuf,
    /// Zero-based YAML document index inside the file.
    pub document: usize,
}

impl Question {
    /// Text of the given channel, if the question defines it.
    #[must_use]
    pub fn channel(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    /// Names of the text channels (string fields that are not reserved).
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .keys()
            .map(String::as_str)
            .filter(|k| !RESERVED_FIELDS.contains(k))
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Builder used by tests and by callers assembling banks in memory.
#[derive(Debug, Clone)]
pub struct QuestionBuilder {
    question: Question,
}

impl QuestionBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), title.clone());
        Self {
            question: Question {
                title,
                difficulty: 1.0,
                frequency: 1.0,
                tags: BTreeSet::new(),
                scaffold: false,
                autotag: false,
                fields,
                origin: QuestionOrigin::default(),
            },
        }
    }

    #[must_use]
    pub fn difficulty(mut self, difficulty: f64) -> Self {
        self.question.difficulty = difficulty;
        self.question.fields.insert("difficulty".into(), difficulty.to_string());
        self
    }

    #[must_use]
    pub fn frequency(mut self, frequency: f64) -> Self {
        self.question.frequency = frequency;
        self.question.fields.insert("frequency".into(), frequency.to_string());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.question.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn scaffold(mut self, scaffold: bool) -> Self {
        self.question.scaffold = scaffold;
        self
    }

    #[must_use]
    pub fn channel(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.question.fields.insert(id.into(), text.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Question {
        self.question
    }
}
