//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database failed or is unreachable.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A persisted row could not be materialized into a record
    /// (e.g. an unrecognized event literal).
    #[error("invalid row: {0}")]
    InvalidRow(#[from] retrace_types::TypeError),

    /// A persisted timestamp could not be parsed.
    #[error("invalid timestamp in row: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
}
