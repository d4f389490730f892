//! Port definition for viewport visibility observation.

use async_trait::async_trait;

/// One-shot viewport-entry observation for a single image container.
///
/// Implementations wrap whatever intersection primitive the host
/// environment offers; in a non-visual host a manual trigger works.
/// The notification fires at most once per observer: the first entry
/// flips an internal flag irreversibly.
#[async_trait]
pub trait VisibilityPort: Send + Sync {
    /// Resolves once the observed container first enters the viewport,
    /// expanded by `margin_px` on every side, with at least `threshold`
    /// (0-1) of the container visible. Resolves immediately if entry
    /// has already been observed.
    async fn entered(&self, margin_px: u32, threshold: f32);

    /// Whether entry has already been observed.
    fn is_in_view(&self) -> bool;
}
