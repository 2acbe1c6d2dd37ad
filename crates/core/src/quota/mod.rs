//! Quota trees: how many questions to take from which part of the bank.
//!
//! A quota spec is parsed once into [`QuotaSpec`] and resolved against the
//! bank with [`build`] into a [`QuotaNode`] tree whose ranges are concrete.

pub mod builder;
pub mod node;
pub mod spec;

use thiserror::Error;

use crate::tags::QueryError;

pub use builder::build;
pub use node::{NodeKind, QuotaNode};
pub use spec::{Bound, QuotaSpec, parse_range};

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("invalid quota '{lemma}': {reason}")]
    InvalidSpec { lemma: String, reason: String },

    #[error(
        "quota '{lemma}' has an empty range [{min}:{max}] (maybe there are not enough questions in the bank)"
    )]
    EmptyRange { lemma: String, min: usize, max: usize },

    #[error("tag query '{0}' matches no question in the bank")]
    NoQuestions(String),

    #[error("cannot pair key '{key}' with value '{value}': one side must be a count range")]
    InvalidPairing { key: String, value: String },

    #[error("quota '{0}' is unbounded and nothing limits it")]
    Unresolved(String),

    #[error("quota tree is not correct: '{0}' has neither questions nor children")]
    IncorrectTree(String),

    #[error("quota '{lemma}' cannot grow past {max}")]
    CannotGrow { lemma: String, max: usize },

    #[error("quota '{0}' has no child able to grow")]
    NoGrowableChild(String),

    #[error("cannot take {amount} questions from a quota in [{min}:{max}]")]
    AmountOutOfRange { amount: usize, min: usize, max: usize },

    #[error(transparent)]
    Query(#[from] QueryError),
}
