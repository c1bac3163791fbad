//! Error types for the hardware bus library

use thiserror::Error;

/// Hardware bus error types
#[derive(Debug, Error)]
pub enum BusError {
    /// Broker connection dropped or could not be established
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Broker did not become ready in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Publish request was rejected by the client
    #[error("Publish failed: {0}")]
    Publish(String),

    /// Command envelope could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid bus configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for bus operations
pub type BusResult<T> = Result<T, BusError>;
