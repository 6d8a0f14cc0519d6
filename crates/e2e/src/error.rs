//! Error types for grid verification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category a test report groups errors under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Row count diverged after a mutation or reset
    Count,
    /// Filter result broke its bound or content predicate
    Filter,
    /// Sort or pagination diverged from the computed expectation
    Ordering,
    /// Driver, configuration or I/O problem
    Harness,
}

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Count mismatch after {stage}: expected {expected}, grid shows {actual}")]
    CountMismatch {
        stage: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unexpected message after {action}: expected '{expected}', got '{actual}'")]
    UnexpectedMessage {
        action: String,
        expected: String,
        actual: String,
    },

    #[error("Filter {predicate} shows {visible} rows, more than the {bound} expected")]
    FilterBound {
        predicate: String,
        visible: usize,
        bound: usize,
    },

    #[error("Filter {predicate} returned no rows")]
    FilterEmpty { predicate: String },

    #[error("Filter {predicate}: row {row} reads '{actual}'")]
    FilterContent {
        predicate: String,
        row: usize,
        actual: String,
    },

    #[error("Filter state leaked: reset shows {actual} rows, expected {expected}")]
    FilterLeak { expected: usize, actual: usize },

    #[error("Sort {instruction} diverges at row {row}: expected '{expected}', got '{actual}'")]
    SortMismatch {
        instruction: String,
        row: usize,
        expected: String,
        actual: String,
    },

    #[error("Sort {instruction} changed the row set: {before} rows before, {after} after")]
    SortRowSet {
        instruction: String,
        before: usize,
        after: usize,
    },

    #[error("Pagination after {action}: expected {expected}, grid shows {actual}")]
    PaginationMismatch {
        action: String,
        expected: String,
        actual: String,
    },

    #[error("Row {row} status is {actual}, expected {expected}")]
    StatusMismatch {
        row: usize,
        expected: bool,
        actual: bool,
    },

    #[error("Bulk action touched {visible} rows, expected at most {bound}")]
    BulkBound { visible: usize, bound: usize },

    #[error("Baseline not established; run a baseline step first")]
    NoBaseline,

    #[error("Grid has no status column")]
    NoStatusColumn,

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Suite parse error: {0}")]
    SuiteParse(String),

    #[error("Grid {grid} is not reachable after {attempts} attempts")]
    Unreachable { grid: String, attempts: usize },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Model error: {0}")]
    Model(#[from] gridcheck_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    pub fn category(&self) -> FailureCategory {
        match self {
            E2eError::CountMismatch { .. }
            | E2eError::UnexpectedMessage { .. }
            | E2eError::BulkBound { .. }
            | E2eError::StatusMismatch { .. } => FailureCategory::Count,
            E2eError::FilterBound { .. }
            | E2eError::FilterEmpty { .. }
            | E2eError::FilterContent { .. }
            | E2eError::FilterLeak { .. } => FailureCategory::Filter,
            E2eError::SortMismatch { .. }
            | E2eError::SortRowSet { .. }
            | E2eError::PaginationMismatch { .. } => FailureCategory::Ordering,
            _ => FailureCategory::Harness,
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
