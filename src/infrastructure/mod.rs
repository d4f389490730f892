//! Infrastructure layer with the cache, transform engine, and adapters.

/// Pipeline configuration.
pub mod config;
/// Image processing (eviction cache, transforms, optimization).
pub mod image;
/// Visibility adapters.
pub mod visibility;

pub use config::{CacheConfig, PipelineConfig, RevealConfig, ViewportConfig};
pub use image::{
    CacheStats, ImageOptimizer, OptimizeOptions, ProcessedImageCache, ResultMemo, SizePolicy,
};
pub use visibility::ManualVisibility;
