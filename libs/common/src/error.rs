//! Custom error types for the common library
//!
//! This module defines the error type shared by every key-value store
//! backend used to hold portal sessions.

use thiserror::Error;

/// Custom error type for key-value store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error occurred while reading or writing the backing file
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a JSON object of strings
    #[error("Store data is corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    /// Error reported by the Redis server or client
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Configuration error
    #[error("Store configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
