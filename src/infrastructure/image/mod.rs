//! Image processing infrastructure.
//!
//! This module provides:
//! - A bounded eviction cache for processed renditions
//! - The transform engine (recompress, thumbnail, blurred placeholder)
//! - The optimization orchestrator tying the two together

pub mod eviction_cache;
pub mod optimizer;
pub mod transform;

pub use eviction_cache::{CacheStats, ProcessedImageCache};
pub use optimizer::{ImageOptimizer, OPTIMIZE_FAILED_MESSAGE, OptimizeOptions, ResultMemo};
pub use transform::{
    SizePolicy, blurred_placeholder, optimal_size, preload, recompress, supports_modern_format,
    thumbnail,
};

#[cfg(test)]
pub(crate) mod testing {
    //! Shared helpers for image pipeline tests.

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    /// Encodes a solid-color PNG of the given dimensions as a data URI.
    pub(crate) fn png_data_uri(width: u32, height: u32) -> String {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 80, 40, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(&buf))
    }

    /// Encodes a deterministic noisy PNG as a data URI. Noise resists
    /// compression, so output sizes track the quality factor.
    pub(crate) fn noisy_png_data_uri(width: u32, height: u32) -> String {
        let mut seed = 0x9e37_79b9_u32;
        let img = image::RgbaImage::from_fn(width, height, |_, _| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let [r, g, b, _] = seed.to_le_bytes();
            image::Rgba([r, g, b, 255])
        });
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(&buf))
    }

    /// A payload that is valid base64 but not a decodable image.
    pub(crate) fn corrupt_data_uri() -> String {
        format!(
            "data:image/png;base64,{}",
            BASE64.encode(b"definitely not image bytes")
        )
    }
}
