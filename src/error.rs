//! Crate-wide error taxonomy. Follows the teacher's pattern of deriving
//! both `thiserror::Error` (for `Display`/`std::error::Error`) and
//! `miette::Diagnostic` (for rich terminal reports) on one enum, rather
//! than a module-private error type per component.

use crate::ids::GenomeId;

#[derive(thiserror::Error, miette::Diagnostic, Debug)]
pub enum NeatError {
    #[error("config error in [{section}]: {key}")]
    Config { section: String, key: String },

    #[error("expected {expected} inputs, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("every species was filtered as stagnant")]
    Extinction,

    #[error("genome {0} timed out during evaluation")]
    EvalTimeout(GenomeId),

    #[error("no genome was ever evaluated")]
    NoEvolution,

    #[error("run was cancelled before any generation was evaluated")]
    CancelledBeforeEvaluation,
}

pub type Result<T> = std::result::Result<T, NeatError>;
