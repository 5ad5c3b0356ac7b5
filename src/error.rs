//! Error types for fleetsim
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for fleetsim operations
pub type Result<T> = std::result::Result<T, FleetsimError>;

/// Main error type for fleetsim operations
#[derive(Error, Debug)]
pub enum FleetsimError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Payload encoding error
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Publish error
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Publish failed and the retry policy is exhausted
    #[error("Publish failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: PublishError,
    },
}

/// Invariant violations caught at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Fleet must contain at least one device
    #[error("Fleet size must be positive")]
    EmptyFleet,

    /// Batches must contain at least one reading
    #[error("Batch size must be positive")]
    ZeroBatchSize,
}

/// Errors while encoding or decoding payloads
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Batch could not be serialized to JSON
    #[error("Serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Payload could not be parsed back into readings
    #[error("Payload parsing failed: {0}")]
    Parse(#[source] serde_json::Error),

    /// Compression failed
    #[error("Compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// Decompression failed
    #[error("Decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
}

/// Errors surfaced by a publisher
#[derive(Error, Debug)]
pub enum PublishError {
    /// The remote end rejected the payload
    #[error("Publish rejected: {reason}")]
    Rejected { reason: String },

    /// The publisher is no longer usable
    #[error("Publisher is closed")]
    Closed,

    /// A publish attempt exceeded the configured timeout
    #[error("Publish timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport-level failure
    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),
}
