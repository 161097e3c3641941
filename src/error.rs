//! Error types for schema compilation and input loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while turning a schema fragment into an executable validator.
///
/// Compilation fails only on shapes with no representable interpretation.
/// Always-true and always-false schemas still compile; the diagnostic
/// mapper recovers these errors into a schema-level report entry rather
/// than surfacing them to callers.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown type \"{name}\": expected null, boolean, integer, number, string, array, or object")]
    UnknownType { name: String },

    #[error("malformed schema at {path}: expected {expected}, got {actual}")]
    MalformedNode {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("unsupported constraint at {path}: {message}")]
    UnsupportedConstraint { path: String, message: String },
}

/// Errors while loading a schema or payload from a file or string.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl CompileError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}
