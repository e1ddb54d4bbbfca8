//! Error types for JSON navigation

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Navigation errors over an untyped JSON tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested path does not exist (or is JSON `null`)
    #[error("missing field: {path}")]
    MissingField { path: String },

    /// The path exists but the value has an unexpected JSON type
    #[error("type mismatch at {path}: expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },
}

impl Error {
    pub(crate) fn missing(path: &str) -> Self {
        Error::MissingField {
            path: path.to_string(),
        }
    }

    pub(crate) fn mismatch(path: &str, expected: &'static str) -> Self {
        Error::TypeMismatch {
            path: path.to_string(),
            expected,
        }
    }
}
