//! Domain layer with core image entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ArtworkId, OptimizeState, OptimizedImage, RevealEvent, RevealStage};
pub use errors::{SourceError, TransformError};
pub use ports::{ArtworkSourcePort, VisibilityPort};
