//! Error types for the engine.
//!
//! - `InvalidArgument`: the caller passed something unusable (a non-numeric
//!   id, an unknown nutrient name). No partial result is returned.
//! - `Store`: the store failed. `StoreError::Unavailable` is the fatal kind
//!   and is always propagated.
//! - `Load` / `Config`: problems opening the store or reading configuration.
//! - `Pipeline` / `Task`: a filter stage or a blocking task failed.
//!
//! "Nothing found" is never an error: operations return an empty Vec or None.

use data_loader::{DataLoadError, StoreError};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid {field}: {value:?}")]
    InvalidArgument { field: String, value: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to load data: {0}")]
    Load(#[from] DataLoadError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Filter stage failed: {0:#}")]
    Pipeline(anyhow::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl EngineError {
    pub fn invalid_argument(field: &str, value: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// True for errors that mean the store can't be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EngineError::Store(StoreError::Unavailable(_)))
    }
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;

/// Parse a caller-supplied identifier, mapping failure to `InvalidArgument`
pub(crate) fn parse_id<T: FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EngineError::invalid_argument(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id::<i64>("user_id", " 38094 ").unwrap(), 38094);
        assert!(matches!(
            parse_id::<i64>("user_id", "abc"),
            Err(EngineError::InvalidArgument { field, value }) if field == "user_id" && value == "abc"
        ));
        assert!(parse_id::<i64>("user_id", "").is_err());
    }

    #[test]
    fn test_unavailable_is_detected() {
        let err: EngineError = StoreError::Unavailable("down".into()).into();
        assert!(err.is_unavailable());
        assert!(!EngineError::invalid_argument("x", "y").is_unavailable());
    }

    #[test]
    fn test_display() {
        let err = EngineError::invalid_argument("nutrient", "fiber");
        assert_eq!(err.to_string(), "Invalid nutrient: \"fiber\"");
    }
}
