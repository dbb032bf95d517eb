//! Error types for the data-loader crate.
//!
//! Two families live here:
//! - `DataLoadError` covers reading and validating the dataset files
//! - `StoreError` is what every `RecipeStore` query can fail with
//!
//! Both derive `thiserror::Error`, so `Display` and `std::error::Error`
//! come from the `#[error(...)]` attributes.

use thiserror::Error;

/// Errors that can occur during data loading and validation
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    ///
    /// This variant stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., review for a missing recipe)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u64 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DataLoadError {
    /// True for failures that may go away on a later attempt
    /// (missing files, I/O hiccups), false for bad data.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::IoError(_))
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

/// Errors returned by `RecipeStore` queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing store cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A query carried a deadline and ran past it
    #[error("Query exceeded its deadline")]
    DeadlineExceeded,

    /// The query itself is malformed (e.g., unsorted bucket boundaries)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
