//! Galeria pipeline - progressive image loading for an artwork gallery.
//!
//! This crate provides the client-side image delivery core of the gallery:
//! a bounded eviction cache for processed images, a transform engine that
//! derives full, thumbnail and placeholder renditions from a raw payload,
//! and the staged reveal machinery that swaps them in as they become ready.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the reveal and lazy-loading services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing the cache, transform engine, and adapters.
pub mod infrastructure;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "galeria-pipeline";
