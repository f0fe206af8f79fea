//! Error types for the flow viewport library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for flow viewport operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Path string could not be parsed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Path component is not a legal identifier
    #[error("Invalid identifier '{0}' in path")]
    InvalidIdentifier(String),

    /// A selection stage was built on an input without a path interface
    #[error("Scene index '{0}' does not expose a path interface")]
    MissingPathInterface(String),

    /// A single scene index path was requested but the mapping fanned out
    #[error("Application path {app_path} maps to {count} prim paths, expected at most one")]
    PrimPathsCountOutOfRange { app_path: String, count: usize },

    /// No producer factory for a node type
    #[error("No scene index producer registered for node type '{0}'")]
    UnknownNodeType(String),

    /// Node is already registered
    #[error("Node '{0}' already owns a scene index registration")]
    AlreadyRegistered(String),

    /// Configuration file does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid path error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }
}

/// Result type alias for flow viewport operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::InvalidIdentifier("3d".into());
        assert!(e.to_string().contains("3d"));

        let e = Error::PrimPathsCountOutOfRange { app_path: "|world|stage,/A".into(), count: 3 };
        assert!(e.to_string().contains("/A"));
        assert!(e.to_string().contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
