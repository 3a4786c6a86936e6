/// Error types for genescout.
///
/// Two families of failure exist and callers are expected to treat them
/// differently:
///
/// 1. **Validation failures** ([`ValidationError`]) describe why a requested
///    gene sequence was rejected. They are the caller's fault, always
///    recoverable, and their message is meant to be shown verbatim.
/// 2. **Operational failures** (everything else in [`SearchError`]) come from
///    the file system. They are never retried by the engine and should be
///    surfaced to remote callers as an opaque internal failure.
///
/// ```rust,ignore
/// match finder.find(gene) {
///     Ok(true) => // found,
///     Ok(false) => // not found,
///     Err(e) if e.is_validation() => // bad input, show e.to_string(),
///     Err(e) => // internal failure,
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

use crate::search::validator::GENE_PREFIX;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Reasons a gene sequence is rejected before any file I/O takes place
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing gene prefix: {}", GENE_PREFIX)]
    MissingPrefix,
    #[error("invalid gene template")]
    InvalidTemplate,
    #[error("gene sequence larger than file")]
    LargerThanFile,
}

/// Errors that can occur while opening or searching a DNA file
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an error from opening `path` onto the typed variants
    pub fn from_open(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }

    /// Whether this error was caused by a malformed gene sequence
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
