//! The `((name,arg,...))` macro template engine.

pub mod builtins;
pub mod calc;
pub mod engine;
pub mod scanner;

use thiserror::Error;

use crate::macros::MacroDefError;

pub use builtins::{Builtin, registry};
pub use engine::{DEFAULT_MAX_STEPS, Engine, Invocation, RenderState};
pub use scanner::{Located, Scanner, Span, locate, split_args, unescape};

#[derive(Debug, Error)]
pub enum MacroError {
    #[error("directive opened and never closed: '{0}'")]
    Unterminated(String),

    #[error("unknown macro or operator '{0}'")]
    Unknown(String),

    #[error(transparent)]
    Definition(#[from] MacroDefError),

    #[error("{name} expects {expected} arguments, got {got}")]
    Arity { name: String, expected: String, got: usize },

    #[error("{name}: '{value}' is not a valid number")]
    BadNumber { name: String, value: String },

    #[error("{0}: nothing to choose from")]
    EmptyChoice(String),

    #[error("CALC: {0}")]
    Calc(String),

    #[error("expansion did not finish after {0} steps (self-referencing macro?)")]
    ExpansionLimit(usize),
}
