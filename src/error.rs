//! Error types for syncgate
//!
//! This module defines the error hierarchy shared by all primitives:
//! - Usage errors (misuse of a primitive's contract)
//! - Access errors (a directory lister failing on a path)
//! - Configuration errors
//! - Task errors (spawned work panicking)
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - A timed-out wait is a status, not an error; it never appears here

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the syncgate toolkit
#[derive(Error, Debug)]
pub enum SyncgateError {
    /// Contract misuse on a primitive
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// Directory lister failure during a search
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task/spawning errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Misuse of a primitive's contract
///
/// These are surfaced immediately to the caller and never retried
/// internally. They always leave the protected state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `done()` called when no tasks are outstanding
    #[error("done() called with no outstanding tasks (pending count already 0)")]
    UnbalancedDone,

    /// A deposit or withdraw was requested for a zero amount
    #[error("{operation} amount must be at least 1")]
    ZeroAmount { operation: &'static str },
}

/// A directory lister failed on a path
///
/// During a search these are recorded against the failing path and the
/// traversal of sibling subtrees continues.
#[derive(Error, Debug, Clone)]
pub enum AccessError {
    /// Permission denied reading a directory
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Path does not exist (or vanished mid-walk)
    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure
    #[error("Failed to read directory '{path}': {reason}")]
    Io { path: PathBuf, reason: String },
}

impl AccessError {
    /// The path this error was raised for
    pub fn path(&self) -> &PathBuf {
        match self {
            AccessError::PermissionDenied { path } => path,
            AccessError::NotFound { path } => path,
            AccessError::Io { path, .. } => path,
        }
    }

    /// Check if this error is recoverable (skip the subtree and continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AccessError::PermissionDenied { .. } | AccessError::NotFound { .. }
        )
    }

    /// Build an AccessError from an `std::io::Error` raised for `path`
    pub fn from_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => AccessError::PermissionDenied { path },
            std::io::ErrorKind::NotFound => AccessError::NotFound { path },
            _ => AccessError::Io {
                path,
                reason: err.to_string(),
            },
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid task cap
    #[error("Invalid task limit {count}: must be between 1 and {max}")]
    InvalidTaskLimit { count: usize, max: usize },

    /// Invalid exclude pattern
    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },
}

/// Errors from dispatched tasks
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task panicked
    #[error("Task '{name}' panicked")]
    Panicked { name: String },
}

/// Result type alias for SyncgateError
pub type Result<T> = std::result::Result<T, SyncgateError>;

/// Result type alias for UsageError
pub type UsageResult<T> = std::result::Result<T, UsageError>;

/// Result type alias for AccessError
pub type AccessResult<T> = std::result::Result<T, AccessError>;
