//! Error types for the linear algebra crate.

use thiserror::Error;

/// Which axis of a matrix an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Row index.
    Row,
    /// Column index.
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Errors that can occur in GF(2) matrix operations.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LinalgError {
    /// Index outside the matrix.
    #[error("{axis} index {index} out of bounds (size {size})")]
    IndexOutOfBounds {
        /// The axis the index refers to.
        axis: Axis,
        /// The offending index.
        index: usize,
        /// Size of that axis.
        size: usize,
    },

    /// A row or column was added to itself, which would zero it.
    #[error("cannot add {axis} {index} to itself")]
    SameIndex {
        /// The axis of the operation.
        axis: Axis,
        /// The index used as both source and destination.
        index: usize,
    },

    /// Operand shapes do not fit together.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Rows passed to a constructor have different lengths.
    #[error("row {row} has {got} entries, expected {expected}")]
    RaggedRows {
        /// Index of the first offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// A permutation is not a bijection on `0..len`.
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Text or JSON input could not be parsed as a bit matrix.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for linear algebra operations.
pub type LinalgResult<T> = Result<T, LinalgError>;
