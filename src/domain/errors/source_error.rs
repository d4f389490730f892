//! Artwork source error types.

use thiserror::Error;

/// Result type for artwork source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors surfaced by the remote artwork record store.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// No record exists for the requested artwork.
    #[error("artwork not found: {0}")]
    NotFound(String),
    /// The fetch itself failed.
    #[error("fetch error: {0}")]
    Fetch(String),
}

impl SourceError {
    /// Creates a not-found error for the given artwork.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Creates a fetch error.
    #[must_use]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }
}
