//! Error types for snapr
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// All error types that can occur in snapr
#[derive(Debug, Error)]
pub enum SnaprError {
    /// Params file path does not resolve to an existing file
    #[error("Params file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Params document is missing a key or holds a malformed value
    #[error("Invalid params document: {0}")]
    InvalidParams(String),

    /// Year substitution produced a date that does not exist
    #[error("Cannot move {date} to year {year}")]
    InvalidDate { date: NaiveDate, year: i32 },

    /// Git invocation failure
    #[error("Git error: {0}")]
    Git(String),

    /// Git worktree setup/teardown error
    #[error("Worktree error: {0}")]
    Worktree(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for snapr operations
pub type Result<T> = std::result::Result<T, SnaprError>;
