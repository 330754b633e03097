//! Error types for the micronet library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum MinetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid count value '{value}' at row {row}, column {col}")]
    InvalidCount {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        value: String,
        column: String,
        row: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate feature identifier '{0}'")]
    DuplicateFeature(String),

    #[error("Column '{0}' not found in association table")]
    UnknownColumn(String),

    #[error("There is no column matching P-values: {0}")]
    MissingPvalueColumn(String),

    #[error("Association table has no adjusted p-values; apply FDR correction first")]
    MissingAdjusted,

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Worker pool error: {0}")]
    Worker(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, MinetError>;
