//! Artwork identifier type.

/// Opaque identifier for an artwork record in the remote catalog.
///
/// The pipeline never inspects it; it only keys fetches through the
/// [`ArtworkSourcePort`](crate::domain::ports::ArtworkSourcePort).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtworkId(pub String);

impl ArtworkId {
    /// Creates a new `ArtworkId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ArtworkId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ArtworkId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
