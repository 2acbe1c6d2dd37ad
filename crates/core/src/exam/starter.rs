//! Starter index written by `randexam init`.

use std::fs;
use std::path::Path;

use super::loader::ExamLoadError;

pub const STARTER_INDEX: &str = r#"# Exam index. `randexam check` shows how `parts` resolves against the bank.
title: Final exam
difficulty: 10
tolerance: 0.5
tries: 1000
bank: questions
files: [description.md, notes.md]
macros:
  - ((HEADER)): "((COUNTER)). "
  - ((POINTS,N)): "(N points)"
begin_description: |
  # ((title))
begin_notes: |
  # ((title)): notes
end_description: |
  Generated on ((DATE)).
parts:
  - intro
  - all: '+'
"#;

/// Write the starter index; never overwrites an existing file.
pub fn write_starter(index: &Path) -> Result<(), ExamLoadError> {
    if index.exists() {
        return Err(ExamLoadError::AlreadyExists(index.display().to_string()));
    }
    if let Some(parent) = index.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ExamLoadError::WriteError(parent.display().to_string(), e))?;
    }
    fs::write(index, STARTER_INDEX)
        .map_err(|e| ExamLoadError::WriteError(index.display().to_string(), e))
}
