//! Error types for EIS Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Column mismatch: expected {expected} values, got {actual}")]
    ColumnMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, CoreError>;
