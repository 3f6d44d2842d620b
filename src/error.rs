//! Error types for the storage client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by the storage client.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to initialize client: {0}")]
    ClientInit(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to build request for {path}: {reason}")]
    RequestBuild { path: String, reason: String },

    #[error("request execution failed: {0}")]
    RequestExec(#[from] reqwest::Error),

    #[error("container {name} not found")]
    NotFound { name: String },

    #[error("unexpected HTTP status {status} for {path}")]
    UnexpectedStatus { status: StatusCode, path: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
