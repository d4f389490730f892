//! Image transform error types.

use thiserror::Error;

/// Result type for transform operations.
pub type TransformResult<T> = std::result::Result<T, TransformError>;

/// Errors produced by the image transform engine.
///
/// Every transform call resolves to one of these on a malformed payload;
/// a transform never hangs.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// Raw payload could not be decoded as an image.
    #[error("decode error: {0}")]
    Decode(String),
    /// Re-encoding the processed image failed.
    #[error("encode error: {0}")]
    Encode(String),
    /// A blocking transform task was cancelled or panicked.
    #[error("transform task failed: {0}")]
    Task(String),
}

impl TransformError {
    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates an encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }
}
