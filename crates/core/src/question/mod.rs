//! Question records and the bank loader.

pub mod loader;
pub mod types;

pub use loader::{QuestionLoadError, load_question_file, load_questions, parse_questions};
pub use types::{ALL_TAG, Question, QuestionBuilder, QuestionOrigin, RESERVED_FIELDS};
