//! Shared error types for dataset construction and I/O.

use std::io;

/// Errors that can occur when building or loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no feature columns")]
    EmptyFeatures,

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("{field} length mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        field: &'static str,
    },

    #[error("dataset must contain a column named '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}
