//! Files tree error types.

use thiserror::Error;

/// Files tree operation errors.
#[derive(Debug, Error)]
pub enum FilesError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("folder not empty: {0}")]
    NotEmpty(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("not a folder: {0}")]
    NotAFolder(String),

    #[error("node has no parent: {0}")]
    NoParent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for files tree operations.
pub type FilesResult<T> = std::result::Result<T, FilesError>;
