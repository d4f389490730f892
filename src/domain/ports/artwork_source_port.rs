//! Port definition for the remote artwork record store.

use async_trait::async_trait;

use crate::domain::entities::ArtworkId;
use crate::domain::errors::SourceResult;

/// Port for fetching raw artwork image payloads.
///
/// The backing store is an opaque record service; whether it splits
/// metadata from the image blob is its own concern. This port exposes
/// only the blob fetch.
#[async_trait]
pub trait ArtworkSourcePort: Send + Sync {
    /// Fetches the raw encoded image payload for an artwork.
    ///
    /// The payload is an arbitrarily large encoded image, typically a
    /// base64 data URI. The pipeline treats it as an opaque string.
    async fn fetch_image(&self, id: &ArtworkId) -> SourceResult<String>;
}
