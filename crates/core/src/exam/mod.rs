//! Exam index, run parameters and output files.

pub mod loader;
pub mod output;
pub mod starter;
pub mod types;

pub use loader::{ExamLoadError, default_seed, load_exam, parse_exam, resolve_settings};
pub use output::{OutputError, first_free_edition, output_paths, write_outputs};
pub use starter::{STARTER_INDEX, write_starter};
pub use types::{DEFAULT_TOLERANCE, DEFAULT_TRIES, ExamSpec, Overrides, Settings};
