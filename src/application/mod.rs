//! Application layer tying the pipeline to consuming views.

/// Reveal and lazy-loading services.
pub mod services;

pub use services::{LazyArtwork, LazyDisplay, ProgressiveReveal};
