//! Custom error types for the portal client

use thiserror::Error;

/// Message shown when a download is refused because of unpaid fees
pub const FEES_OUTSTANDING_MESSAGE: &str =
    "You have outstanding fees. Please clear them to download documents.";

/// Custom error type for the portal client
#[derive(Error, Debug)]
pub enum ApiError {
    /// No access token is stored locally; no request was sent
    #[error("Not authenticated")]
    Unauthenticated,

    /// The backend (or the local form check) rejected the input
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response reduced to a generic message
    #[error("{0}")]
    RequestFailed(String),

    /// The backend refused a download with 403
    #[error("{}", FEES_OUTSTANDING_MESSAGE)]
    FeesOutstanding,

    /// The request never produced a usable response
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Session store error
    #[error("Session store error: {0}")]
    Store(#[from] common::StoreError),

    /// Local file system error while saving a download
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Closed classification of [`ApiError`] for callers that branch on kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    ValidationFailed,
    RequestFailed,
    FeesOutstanding,
    /// Store, file system or configuration failure on this machine
    Local,
}

impl ApiError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthenticated => ErrorKind::Unauthenticated,
            ApiError::Validation(_) => ErrorKind::ValidationFailed,
            ApiError::RequestFailed(_) | ApiError::Transport(_) => ErrorKind::RequestFailed,
            ApiError::FeesOutstanding => ErrorKind::FeesOutstanding,
            ApiError::Store(_) | ApiError::Io(_) | ApiError::Config(_) => ErrorKind::Local,
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
