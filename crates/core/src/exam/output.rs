//! Output file naming and writing.
//!
//! For an index `exams/final.yaml` with `files: [description.md]`, edition 0
//! writes `exams/final_description.md` and edition 3 writes
//! `exams/final_description_3.md`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {0}: {1}")]
    Write(String, #[source] std::io::Error),
}

/// Output paths of one edition, in `files` order.
#[must_use]
pub fn output_paths(index: &Path, files: &[String], edition: usize) -> Vec<PathBuf> {
    let dir = index.parent().unwrap_or_else(|| Path::new(""));
    let base = index.file_stem().and_then(|s| s.to_str()).unwrap_or_default();

    files
        .iter()
        .map(|file| {
            let file = Path::new(file);
            let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let suffix = file
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| format!(".{ext}"))
                .unwrap_or_default();
            let name = if edition == 0 {
                format!("{base}_{stem}{suffix}")
            } else {
                format!("{base}_{stem}_{edition}{suffix}")
            };
            dir.join(name)
        })
        .collect()
}

/// First edition none of whose output files exist yet.
#[must_use]
pub fn first_free_edition(index: &Path, files: &[String]) -> (usize, Vec<PathBuf>) {
    let mut edition = 0;
    loop {
        let paths = output_paths(index, files, edition);
        if !paths.iter().any(|p| p.exists()) {
            return (edition, paths);
        }
        edition += 1;
    }
}

/// Write each rendered channel to its path.
pub fn write_outputs(paths: &[PathBuf], contents: &[String]) -> Result<(), OutputError> {
    for (path, content) in paths.iter().zip(contents) {
        fs::write(path, content)
            .map_err(|e| OutputError::Write(path.display().to_string(), e))?;
        info!(path = %path.display(), bytes = content.len(), "output written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn files() -> Vec<String> {
        vec!["description.md".to_string(), "notes.tex".to_string()]
    }

    #[test]
    fn edition_zero_has_no_number() {
        let paths = output_paths(Path::new("exams/final.yaml"), &files(), 0);
        assert_eq!(
            paths,
            vec![PathBuf::from("exams/final_description.md"), PathBuf::from("exams/final_notes.tex")]
        );
        let paths = output_paths(Path::new("final.yaml"), &files(), 2);
        assert_eq!(paths[1], PathBuf::from("final_notes_2.tex"));
    }

    #[test]
    fn free_edition_skips_existing_outputs() {
        let tmp = tempdir().unwrap();
        let index = tmp.path().join("exam.yaml");
        assert_eq!(first_free_edition(&index, &files()).0, 0);

        fs::write(tmp.path().join("exam_notes.tex"), "x").unwrap();
        fs::write(tmp.path().join("exam_description_1.md"), "x").unwrap();
        let (edition, paths) = first_free_edition(&index, &files());
        assert_eq!(edition, 2);
        assert_eq!(paths[0], tmp.path().join("exam_description_2.md"));
    }
}
