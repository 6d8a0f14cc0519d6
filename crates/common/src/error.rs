//! Error types for the grid data model

use thiserror::Error;

/// Result type alias using the model Error
pub type Result<T> = std::result::Result<T, Error>;

/// Model-level error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown column '{column}' in grid '{grid}'")]
    UnknownColumn { grid: String, column: String },

    #[error("Column '{0}' is not sortable")]
    NotSortable(String),

    #[error("Cannot parse '{value}' in column '{column}' as a number")]
    NotNumeric { column: String, value: String },

    #[error("No pagination indicator in '{0}'")]
    MissingIndicator(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("Expected count would drop below zero (current {current}, removing {removed})")]
    CountUnderflow { current: usize, removed: usize },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}
