pub mod lazy_artwork;
pub mod progressive_reveal;

pub use lazy_artwork::{LazyArtwork, LazyDisplay};
pub use progressive_reveal::ProgressiveReveal;
