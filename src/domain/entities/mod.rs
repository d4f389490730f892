//! Domain entity definitions.

mod artwork;
mod optimized;
mod reveal;

pub use artwork::ArtworkId;
pub use optimized::{OptimizeState, OptimizedImage};
pub use reveal::{RevealEvent, RevealStage};
