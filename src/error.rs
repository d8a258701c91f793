//! Error types for apimatrix

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// apimatrix errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("Type mismatch at '{path}': segment '{segment}' is bound to a scalar")]
    TypeMismatch { path: String, segment: String },

    #[error("Sheet '{sheet}': column '{column}' not found")]
    MissingColumn { sheet: String, column: String },

    #[error("Value parse error: '{raw}' is not a valid {expected}")]
    ValueParse { raw: String, expected: String },

    #[error("Attribute '{attribute}' has no candidate values")]
    EmptyCandidateSet { attribute: String },

    #[error("Test vector has {actual} values, expected {expected}")]
    VectorArity { expected: usize, actual: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
