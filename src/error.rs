use thiserror::Error;

use crate::ds::ShapeIndex;

/// Top-level error type for the pairing engine.
#[derive(Debug, Error)]
pub enum BopdsError {
    #[error(transparent)]
    Iterator(#[from] IteratorError),

    #[error(transparent)]
    DataStructure(#[from] DataStructureError),
}

/// Misuse of the pair iterator.
#[derive(Debug, Error)]
pub enum IteratorError {
    #[error("shape data structure is not set")]
    DataStructureNotSet,

    #[error("fuzzy value must be a non-negative number, got {0}")]
    InvalidFuzzyValue(f64),
}

/// Errors raised while filling or querying the shape data structure.
#[derive(Debug, Error)]
pub enum DataStructureError {
    #[error("shape index {0} is out of range")]
    IndexOutOfRange(ShapeIndex),

    #[error("sub-shape {sub} must be appended before its parent")]
    SubShapeNotFound { sub: ShapeIndex },

    #[error("argument {0} is still open")]
    ArgumentAlreadyOpen(usize),

    #[error("no argument is open")]
    NoOpenArgument,

    #[error("pave block not found")]
    PaveBlockNotFound,

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Convenience type alias for results using [`BopdsError`].
pub type Result<T> = std::result::Result<T, BopdsError>;
