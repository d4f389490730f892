//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for the image pipeline.
///
/// The host application's composition root deserializes this (or takes
/// the defaults) and constructs the cache and services from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Eviction cache limits.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Staged reveal and visibility tuning.
    #[serde(default)]
    pub reveal: RevealConfig,

    /// Viewport the sizing policy targets.
    #[serde(default)]
    pub viewport: ViewportConfig,
}

/// Limits for the processed-image eviction cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry-count ceiling that triggers a sweep.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Total-size ceiling in bytes that triggers a sweep.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: usize,

    /// Per-item size ceiling in bytes; larger payloads are never cached.
    #[serde(default = "default_max_item_bytes")]
    pub max_item_bytes: usize,

    /// Fraction of each ceiling a sweep drains down to. Sweeping below
    /// the ceiling avoids re-sweeping on every subsequent insert.
    #[serde(default = "default_sweep_target_ratio")]
    pub sweep_target_ratio: f64,

    /// How many leading bytes of the raw payload feed the cache key.
    /// Hashing only a prefix trades a theoretical false hit between
    /// payloads sharing an identical header for not walking the whole
    /// payload on every lookup.
    #[serde(default = "default_key_prefix_len")]
    pub key_prefix_len: usize,

    /// Hash the entire raw payload instead of the prefix. Exact keys at
    /// the cost of throughput on large payloads.
    #[serde(default)]
    pub hash_full_payload: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_size_bytes: default_max_size_bytes(),
            max_item_bytes: default_max_item_bytes(),
            sweep_target_ratio: default_sweep_target_ratio(),
            key_prefix_len: default_key_prefix_len(),
            hash_full_payload: false,
        }
    }
}

/// Tuning for the staged reveal and the visibility gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Pause between the thumbnail transition and the full-image
    /// preload, in milliseconds.
    #[serde(default = "default_full_image_delay_ms")]
    pub full_image_delay_ms: u64,

    /// Fraction of the container that must be visible to count as
    /// entered.
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,

    /// Lookahead margin around the viewport, in pixels, so loading
    /// starts slightly before the container is actually visible.
    #[serde(default = "default_visibility_margin_px")]
    pub visibility_margin_px: u32,
}

impl RevealConfig {
    /// The thumbnail-to-full pause as a [`Duration`].
    #[must_use]
    pub const fn full_image_delay(&self) -> Duration {
        Duration::from_millis(self.full_image_delay_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            full_image_delay_ms: default_full_image_delay_ms(),
            visibility_threshold: default_visibility_threshold(),
            visibility_margin_px: default_visibility_margin_px(),
        }
    }
}

/// Viewport the sizing policy targets. Non-visual hosts keep the
/// defaults; visual hosts report their real dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Viewport width in CSS pixels.
    #[serde(default = "default_viewport_width")]
    pub width: u32,

    /// Device pixel ratio.
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            device_pixel_ratio: default_device_pixel_ratio(),
        }
    }
}

const fn default_max_entries() -> usize {
    100
}

const fn default_max_size_bytes() -> usize {
    50 * 1024 * 1024
}

const fn default_max_item_bytes() -> usize {
    5 * 1024 * 1024
}

const fn default_sweep_target_ratio() -> f64 {
    0.8
}

const fn default_key_prefix_len() -> usize {
    100
}

const fn default_full_image_delay_ms() -> u64 {
    100
}

const fn default_visibility_threshold() -> f32 {
    0.1
}

const fn default_visibility_margin_px() -> u32 {
    200
}

const fn default_viewport_width() -> u32 {
    1280
}

const fn default_device_pixel_ratio() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_ceilings() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.max_size_bytes, 50 * 1024 * 1024);
        assert_eq!(config.max_item_bytes, 5 * 1024 * 1024);
        assert!((config.sweep_target_ratio - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.key_prefix_len, 100);
        assert!(!config.hash_full_payload);
    }

    #[test]
    fn test_reveal_delay_conversion() {
        let config = RevealConfig::default();
        assert_eq!(config.full_image_delay(), Duration::from_millis(100));
    }
}
