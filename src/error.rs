//! Error type shared by the table and linear algebra layers

use crate::table::Dimension;

/// Errors raised at the point a precondition is violated
///
/// Nothing is retried or downgraded. Every failing operation builds its result
/// before exposing it, so an `Err` never leaves a half-built column or frame behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("no such column: {name}")]
    NoSuchColumn { name: String },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("dimension mismatch in {op}: {left} vs {right}")]
    DimensionMismatch {
        op: &'static str,
        left: Dimension,
        right: Dimension,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("{values} values cannot be split into rows of width {width}")]
    RaggedInput { values: usize, width: usize },
}

impl Error {
    pub fn no_such_column(name: impl Into<String>) -> Self {
        Error::NoSuchColumn { name: name.into() }
    }

    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Error::IndexOutOfBounds { index, len }
    }

    pub fn dimension_mismatch(op: &'static str, left: Dimension, right: Dimension) -> Self {
        Error::DimensionMismatch { op, left, right }
    }

    pub fn type_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedOperation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
