use thiserror::Error;

use crate::assembler::AssembleError;
use crate::config::ConfigError;
use crate::exam::{ExamLoadError, OutputError};
use crate::macros::MacroDefError;
use crate::question::QuestionLoadError;
use crate::quota::QuotaError;
use crate::sampler::SampleError;
use crate::tags::QueryError;
use crate::templates::MacroError;

/// Any failure of a generate run.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ExamLoad(#[from] ExamLoadError),

    #[error(transparent)]
    QuestionLoad(#[from] QuestionLoadError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    MacroDef(#[from] MacroDefError),

    #[error(transparent)]
    Macro(#[from] MacroError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl From<AssembleError> for ExamError {
    fn from(err: AssembleError) -> Self {
        match err {
            AssembleError::Quota(e) => ExamError::Quota(e),
            AssembleError::Sample(e) => ExamError::Sample(e),
        }
    }
}
