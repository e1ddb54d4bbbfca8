//! Error types for bundle extraction

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extraction errors
///
/// Single-resource extractors fail hard on missing mandatory fields and
/// malformed dates; business-optional fields are omitted instead. Bundle
/// orchestrators either require full success (KBV prescription, PKV invoice)
/// or report per-entry failures through a callback (pharmacy search).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A mandatory path/value is absent
    #[error("missing field: {path}")]
    MissingField { path: String },

    /// A value is present but has the wrong JSON type
    #[error("type mismatch at {path}: expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },

    /// No known profile/version matched the resource
    #[error("unrecognized profile: {0}")]
    UnrecognizedProfile(String),

    /// A value is present but not parseable as its expected scalar/date type
    #[error("malformed value at {path}: {detail}")]
    MalformedValue { path: String, detail: String },

    /// A bundle is missing a mandatory sub-resource
    #[error("bundle is missing a required {0} resource")]
    MissingResource(&'static str),
}

impl Error {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Error::MissingField { path: path.into() }
    }

    pub(crate) fn malformed(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::MalformedValue {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

impl From<erx_fhir_json::Error> for Error {
    fn from(err: erx_fhir_json::Error) -> Self {
        match err {
            erx_fhir_json::Error::MissingField { path } => Error::MissingField { path },
            erx_fhir_json::Error::TypeMismatch { path, expected } => {
                Error::TypeMismatch { path, expected }
            }
        }
    }
}
