//! User macros declared in the exam index.

pub mod types;

pub use types::{MacroDefError, MacroDefinition, MacroTable};
