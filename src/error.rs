//! Error types for the megalink library.

use thiserror::Error;

/// Main error type for megalink operations.
#[derive(Error, Debug)]
pub enum MegaError {
    /// Share link text is malformed or has the wrong shape.
    #[error("Invalid share link: {0}")]
    InvalidLink(String),

    /// The command API answered with a bare error code instead of a result.
    #[error("API error")]
    ApiError,

    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Encrypted attributes could not be decrypted or parsed.
    #[error("Bad attribute: {0}")]
    BadAttribute(String),

    /// Key material has the wrong structure (compound key, base64, block size).
    #[error("Key decode failed: {0}")]
    Decode(String),

    /// A configured deadline elapsed.
    #[error("Request timed out")]
    Timeout,

    /// Decrypted content does not match the MAC carried in the key material.
    #[error("Content MAC mismatch")]
    MacMismatch,

    /// Operation requires a file node.
    #[error("Node is not a file: {0}")]
    NotAFile(String),

    /// Local I/O error while streaming content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for megalink operations.
pub type Result<T> = std::result::Result<T, MegaError>;

impl From<tokio::time::error::Elapsed> for MegaError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        MegaError::Timeout
    }
}
