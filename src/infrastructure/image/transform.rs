//! Image transform engine.
//!
//! Pure, stateless functions that take a raw encoded payload and return a
//! re-encoded data URI. Callers run them under `spawn_blocking`; nothing
//! here touches the async runtime.

use std::sync::OnceLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;

use crate::domain::errors::{TransformError, TransformResult};

/// Bound for thumbnail renditions, in pixels.
pub const THUMBNAIL_SIZE: u32 = 400;
/// Quality factor for thumbnail renditions.
pub const THUMBNAIL_QUALITY: f32 = 0.7;
/// Edge length of the blurred placeholder canvas, in pixels.
pub const PLACEHOLDER_SIZE: u32 = 40;
/// Quality factor for the placeholder; the payload should be tiny.
pub const PLACEHOLDER_QUALITY: f32 = 0.1;
/// Default gaussian blur radius for placeholders.
pub const DEFAULT_PLACEHOLDER_BLUR: f32 = 20.0;

/// Output of the device-aware sizing policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizePolicy {
    /// Maximum output width in pixels.
    pub width: u32,
    /// Maximum output height in pixels.
    pub height: u32,
    /// Quality factor (0-1) for re-encoding.
    pub quality: f32,
}

/// Recompresses a raw payload, downscaling to fit within
/// `max_width` x `max_height` while preserving aspect ratio. Sources
/// already within bounds are never upscaled.
///
/// Output is JPEG at `quality` on the default path. The runtime's WebP
/// encoder is lossless-only; routing quality-bearing calls through it
/// would discard the quality factor and inflate photographic sources,
/// so the modern format is used only when the caller asks for lossless
/// output (`quality >= 1.0`) and the runtime can encode it.
///
/// # Errors
/// Returns [`TransformError::Decode`] on a malformed payload and
/// [`TransformError::Encode`] if re-encoding fails.
pub fn recompress(
    raw: &str,
    quality: f32,
    max_width: u32,
    max_height: u32,
) -> TransformResult<String> {
    let decoded = decode_payload(raw)?;

    let scaled = if decoded.width() > max_width || decoded.height() > max_height {
        decoded.resize(max_width, max_height, FilterType::Lanczos3)
    } else {
        decoded
    };

    if quality >= 1.0 && supports_modern_format() {
        encode_webp(&scaled)
    } else {
        encode_jpeg(&scaled, quality)
    }
}

/// Produces a thumbnail rendition: [`recompress`] with fixed 400x400
/// bounds at quality 0.7.
///
/// # Errors
/// Same failure modes as [`recompress`].
pub fn thumbnail(raw: &str) -> TransformResult<String> {
    recompress(raw, THUMBNAIL_QUALITY, THUMBNAIL_SIZE, THUMBNAIL_SIZE)
}

/// Produces a heavily blurred micro-placeholder: the source is drawn
/// onto a 40x40 canvas, blurred, and re-encoded as JPEG at quality 0.1
/// for a near-instant first paint.
///
/// # Errors
/// Same failure modes as [`recompress`].
pub fn blurred_placeholder(raw: &str, blur_radius: f32) -> TransformResult<String> {
    let decoded = decode_payload(raw)?;

    // Stretch onto the fixed canvas; distortion is invisible under the
    // blur and at this size.
    let tiny = decoded.resize_exact(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, FilterType::Triangle);
    let blurred = tiny.blur(blur_radius);

    encode_jpeg(&blurred, PLACEHOLDER_QUALITY)
}

/// Device-aware sizing policy, banded into three tiers by viewport
/// width. Each tier caps the pixel-ratio-scaled dimension at its own
/// ceiling and carries its own quality factor.
#[must_use]
pub fn optimal_size(viewport_width: u32, device_pixel_ratio: f32) -> SizePolicy {
    let dpr = f64::from(device_pixel_ratio.max(1.0));

    let (base, cap, quality) = if viewport_width <= 640 {
        (600.0, 800.0, 0.75)
    } else if viewport_width <= 1024 {
        (800.0, 1000.0, 0.80)
    } else {
        (1200.0, 1400.0, 0.85)
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let edge = (base * dpr).min(cap) as u32;

    SizePolicy {
        width: edge,
        height: edge,
        quality,
    }
}

/// Whether the runtime can encode the modern compressed format (WebP).
/// Probed once by encoding a 1x1 image, then memoized. The probe
/// exercises the lossless encoder, so a positive answer only covers
/// lossless output; [`recompress`] routes quality-bearing calls to
/// JPEG regardless.
pub fn supports_modern_format() -> bool {
    static MODERN_FORMAT: OnceLock<bool> = OnceLock::new();
    *MODERN_FORMAT.get_or_init(|| {
        let probe = image::RgbaImage::new(1, 1);
        let mut buf = Vec::new();
        probe
            .write_with_encoder(WebPEncoder::new_lossless(&mut buf))
            .is_ok()
    })
}

/// Verifies that a staged data URI decodes cleanly. Stand-in for an
/// off-screen element preload: the reveal component only swaps a source
/// in once its bytes are known to decode.
///
/// # Errors
/// Returns [`TransformError::Decode`] if the payload is malformed.
pub fn preload(src: &str) -> TransformResult<()> {
    decode_payload(src).map(|_| ())
}

/// Decodes a raw payload: a base64 data URI, or bare base64.
fn decode_payload(raw: &str) -> TransformResult<DynamicImage> {
    let encoded = raw
        .split_once("base64,")
        .map_or(raw, |(_, rest)| rest)
        .trim();

    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| TransformError::decode(format!("invalid base64 payload: {e}")))?;

    image::load_from_memory(&bytes)
        .map_err(|e| TransformError::decode(format!("failed to decode image: {e}")))
}

fn encode_jpeg(img: &DynamicImage, quality: f32) -> TransformResult<String> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let q = (quality.clamp(0.01, 1.0) * 100.0).round() as u8;

    let mut buf = Vec::new();
    // JPEG carries no alpha channel.
    img.to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q))
        .map_err(|e| TransformError::encode(format!("jpeg encode failed: {e}")))?;

    Ok(to_data_uri("jpeg", &buf))
}

fn encode_webp(img: &DynamicImage) -> TransformResult<String> {
    let mut buf = Vec::new();
    // The encoder is lossless, so the quality factor does not apply.
    img.to_rgba8()
        .write_with_encoder(WebPEncoder::new_lossless(&mut buf))
        .map_err(|e| TransformError::encode(format!("webp encode failed: {e}")))?;

    Ok(to_data_uri("webp", &buf))
}

fn to_data_uri(format: &str, bytes: &[u8]) -> String {
    format!("data:image/{format};base64,{}", BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    use crate::infrastructure::image::testing::{noisy_png_data_uri, png_data_uri};

    fn decoded_dimensions(data_uri: &str) -> (u32, u32) {
        let img = decode_payload(data_uri).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_recompress_downscales_oversized_source() {
        let raw = png_data_uri(2000, 1000);
        let out = recompress(&raw, 0.8, 1200, 1200).unwrap();

        let (w, h) = decoded_dimensions(&out);
        assert!(w <= 1200 && h <= 1200);
        // Aspect ratio preserved: 2:1 within rounding.
        assert_eq!(w, 1200);
        assert_eq!(h, 600);
    }

    #[test]
    fn test_recompress_never_upscales() {
        let raw = png_data_uri(100, 100);
        let out = recompress(&raw, 0.8, 1200, 1200).unwrap();

        let (w, h) = decoded_dimensions(&out);
        assert!(w <= 100 && h <= 100);
    }

    #[test]
    fn test_recompress_outputs_data_uri() {
        let raw = png_data_uri(10, 10);
        let out = recompress(&raw, 0.8, 1200, 1200).unwrap();
        assert!(out.starts_with("data:image/"));
        assert!(out.contains(";base64,"));
    }

    #[test]
    fn test_recompress_honors_quality_factor() {
        // A noisy source makes the quality factor visible in the output
        // size: higher quality, bigger payload, and both lossy outputs
        // go through the JPEG path.
        let raw = noisy_png_data_uri(128, 128);
        let low = recompress(&raw, 0.1, 1200, 1200).unwrap();
        let high = recompress(&raw, 0.95, 1200, 1200).unwrap();

        assert!(low.starts_with("data:image/jpeg;base64,"));
        assert!(high.starts_with("data:image/jpeg;base64,"));
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_recompress_uses_modern_format_only_for_lossless() {
        let raw = noisy_png_data_uri(32, 32);
        let lossy = recompress(&raw, 0.8, 1200, 1200).unwrap();
        assert!(lossy.starts_with("data:image/jpeg;base64,"));

        if supports_modern_format() {
            let lossless = recompress(&raw, 1.0, 1200, 1200).unwrap();
            assert!(lossless.starts_with("data:image/webp;base64,"));
        }
    }

    #[test]
    fn test_thumbnail_fits_fixed_bounds() {
        let raw = png_data_uri(1600, 900);
        let out = thumbnail(&raw).unwrap();

        let (w, h) = decoded_dimensions(&out);
        assert!(w <= THUMBNAIL_SIZE && h <= THUMBNAIL_SIZE);
    }

    #[test]
    fn test_placeholder_is_tiny_jpeg() {
        let raw = png_data_uri(800, 600);
        let out = blurred_placeholder(&raw, DEFAULT_PLACEHOLDER_BLUR).unwrap();

        assert!(out.starts_with("data:image/jpeg;base64,"));
        let (w, h) = decoded_dimensions(&out);
        assert_eq!((w, h), (PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
        // The whole point of the placeholder is a tiny payload.
        assert!(out.len() < 4096);
    }

    #[test]
    fn test_decode_failure_is_an_error_not_a_hang() {
        let err = recompress("data:image/png;base64,!!!!", 0.8, 100, 100).unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));

        // Valid base64, but not an image.
        let not_an_image = format!("data:image/png;base64,{}", BASE64.encode(b"hello world"));
        let err = thumbnail(&not_an_image).unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
    }

    #[test]
    fn test_bare_base64_payload_is_accepted() {
        let with_prefix = png_data_uri(8, 8);
        let bare = with_prefix.split_once("base64,").unwrap().1;
        assert!(preload(bare).is_ok());
    }

    #[test_case(320, 1.0 => SizePolicy { width: 600, height: 600, quality: 0.75 } ; "mobile")]
    #[test_case(640, 2.0 => SizePolicy { width: 800, height: 800, quality: 0.75 } ; "mobile capped by ceiling")]
    #[test_case(800, 1.0 => SizePolicy { width: 800, height: 800, quality: 0.80 } ; "tablet")]
    #[test_case(1024, 2.0 => SizePolicy { width: 1000, height: 1000, quality: 0.80 } ; "tablet capped by ceiling")]
    #[test_case(1920, 1.0 => SizePolicy { width: 1200, height: 1200, quality: 0.85 } ; "desktop")]
    #[test_case(1920, 3.0 => SizePolicy { width: 1400, height: 1400, quality: 0.85 } ; "desktop capped by ceiling")]
    fn test_optimal_size_tiers(viewport_width: u32, dpr: f32) -> SizePolicy {
        optimal_size(viewport_width, dpr)
    }

    #[test]
    fn test_modern_format_probe_is_stable() {
        assert_eq!(supports_modern_format(), supports_modern_format());
    }
}
