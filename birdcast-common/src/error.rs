//! Common error types for Birdcast

use thiserror::Error;

/// Common result type for Birdcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Birdcast crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundle or request decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Category value the label encoder was never fitted on
    #[error("y contains previously unseen label for {field}: '{value}'")]
    UnseenLabel { field: String, value: String },

    /// Query resolved to a calendar date that does not exist
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Malformed model bundle or inference failure
    #[error("Model error: {0}")]
    Model(String),
}
