//! Error types for table operations.

use thiserror::Error;

pub type TableResult<T> = Result<T, TableError>;

/// Errors from table construction and column operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column {name} not found")]
    ColumnNotFound { name: String },

    #[error("duplicate column {name}")]
    DuplicateColumn { name: String },

    #[error("column {name} has {len} rows (expected {expected})")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
}
