//! Error types for the forestry price library.
use thiserror::Error;

/// Main error type for forestry price operations
#[derive(Error, Debug)]
pub enum FcpError {
    /// Failed to parse a JSON artifact
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Failed to read an artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decompress an artifact
    #[error("Failed to decompress data: {0}")]
    Decompression(String),

    /// Period string is not `YYYY-MM`
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Forecast segment key could not be decoded
    #[error("Invalid segment key: {0}")]
    InvalidSegmentKey(String),

    /// A required artifact (records or catalog) is unavailable
    #[error("Required artifact unavailable: {0}")]
    MissingArtifact(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

/// Type alias for Results using FcpError
pub type Result<T> = std::result::Result<T, FcpError>;
