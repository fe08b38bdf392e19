// SPDX-License-Identifier: MIT

//! Error types for Repowarden

use thiserror::Error;

/// Result type alias for Repowarden operations
pub type Result<T> = std::result::Result<T, RepowardenError>;

/// Repowarden error types
#[derive(Error, Debug)]
pub enum RepowardenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Pull request error: {0}")]
    PullRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
