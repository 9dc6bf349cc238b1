//! Error types for the structmap core library
//!
//! This module defines the error taxonomy of the mapping engine using
//! thiserror. Missing source data and type-gated fields are designed outcomes
//! of a mapping call and never surface here.

use thiserror::Error;

/// Message raised when a tag declares per-type override paths while its main
/// path is not the multi-type marker.
pub const PER_TYPE_PATH_NOT_VALID: &str =
    "main path should be '+' when using per-type path matching";

/// Main error type for mapping operations
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-provided argument can not take part in a mapping call
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A field annotation is well formed but can not be resolved
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// A field value has no tree representation
    #[error("Unsupported type: {kind}")]
    UnsupportedType {
        kind: String,
        field: Option<String>,
    },

    /// A path expression could not be parsed
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { message: String, path: String },

    /// A field annotation could not be parsed
    #[error("Invalid annotation '{tag}': {message}")]
    InvalidAnnotation { message: String, tag: String },

    /// Two paths address the same tree node with incompatible shapes
    #[error("Path conflict at '{path}': {message}")]
    PathConflict { message: String, path: String },

    /// Nested records went deeper than the configured limit
    #[error("Maximum nesting depth {limit} exceeded (depth {depth})")]
    DepthExceeded { depth: usize, limit: usize },

    /// JSON conversion errors raised by the generic codec
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error bound to a field
    pub fn configuration(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a path parse error
    pub fn invalid_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create an annotation parse error
    pub fn invalid_annotation(message: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::InvalidAnnotation {
            message: message.into(),
            tag: tag.into(),
        }
    }

    /// Create a path conflict error
    pub fn path_conflict(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PathConflict {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Attach the field name to errors raised below field level
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            Self::Configuration { message, field: None } => Self::Configuration {
                message,
                field: Some(name.to_string()),
            },
            Self::UnsupportedType { kind, field: None } => Self::UnsupportedType {
                kind,
                field: Some(name.to_string()),
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
