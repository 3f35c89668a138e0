//! Error types for edit-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in edit-sheets-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(i64, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(i64, u32),

    /// A name was registered twice in the same batch
    #[error("Name already exists: {0}")]
    DuplicateName(String),

    /// Input that cannot be placed into cells
    #[error("Invalid cell input: {0}")]
    InvalidInput(String),
}
