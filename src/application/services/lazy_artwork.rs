//! Visibility-gated artwork image loading.
//!
//! Wraps one image consumer: nothing is fetched or processed until the
//! container first enters the (margin-expanded) viewport, and the gate
//! fires at most once per mount. Dropping the service tears everything
//! down; a late-arriving result lands in dropped channels and is never
//! applied.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::entities::{ArtworkId, OptimizedImage, RevealEvent, RevealStage};
use crate::domain::ports::{ArtworkSourcePort, VisibilityPort};
use crate::infrastructure::config::RevealConfig;
use crate::infrastructure::image::ImageOptimizer;

use super::progressive_reveal::ProgressiveReveal;

/// What the host should render for a lazily loaded artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LazyDisplay<'a> {
    /// Not yet in view; render the neutral waiting placeholder.
    Waiting,
    /// In view, fetch or optimization still in flight.
    Loading,
    /// Fetch, optimization, or reveal failed; render the fixed failure
    /// placeholder, never an image element.
    Failed,
    /// Render this source at this stage's presentation.
    Image {
        /// The data URI to paint.
        src: &'a str,
        /// Stage, carrying opacity and scale hints.
        stage: RevealStage,
    },
}

/// One artwork image consumer behind a visibility gate.
pub struct LazyArtwork {
    artwork_id: ArtworkId,
    source: Arc<dyn ArtworkSourcePort>,
    visibility: Arc<dyn VisibilityPort>,
    optimizer: ImageOptimizer,
    reveal: ProgressiveReveal,
    config: RevealConfig,
    image: Option<OptimizedImage>,
    requested: bool,
    fetch_failed: bool,
}

impl LazyArtwork {
    /// Wires a gated consumer, returning the receiver for terminal
    /// load/error notifications.
    #[must_use]
    pub fn new(
        artwork_id: ArtworkId,
        source: Arc<dyn ArtworkSourcePort>,
        visibility: Arc<dyn VisibilityPort>,
        optimizer: ImageOptimizer,
        config: RevealConfig,
    ) -> (Self, mpsc::UnboundedReceiver<RevealEvent>) {
        let (reveal, events) = ProgressiveReveal::new(config.clone());
        (
            Self {
                artwork_id,
                source,
                visibility,
                optimizer,
                reveal,
                config,
                image: None,
                requested: false,
                fetch_failed: false,
            },
            events,
        )
    }

    /// Waits for the gate, then fetches, optimizes, and reveals.
    ///
    /// The fetch happens exactly once per mount no matter how many times
    /// the visibility signal fires or this is awaited again.
    pub async fn run(&mut self) {
        if self.requested {
            return;
        }

        self.visibility
            .entered(self.config.visibility_margin_px, self.config.visibility_threshold)
            .await;
        self.requested = true;
        debug!(artwork = %self.artwork_id, "Artwork entered viewport, requesting image");

        let raw = match self.source.fetch_image(&self.artwork_id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(artwork = %self.artwork_id, error = %e, "Artwork fetch failed");
                self.fetch_failed = true;
                return;
            }
        };

        let optimized = self.optimizer.optimize(Some(&raw)).await;
        self.reveal.run(&optimized).await;
        self.image = Some(optimized);
    }

    /// What to render right now.
    #[must_use]
    pub fn display(&self) -> LazyDisplay<'_> {
        if !self.visibility.is_in_view() {
            return LazyDisplay::Waiting;
        }
        if self.fetch_failed
            || self.reveal.failed()
            || self.image.as_ref().is_some_and(OptimizedImage::failed)
        {
            return LazyDisplay::Failed;
        }
        let Some(image) = &self.image else {
            return LazyDisplay::Loading;
        };
        match self.reveal.current_src(image) {
            Some(src) => LazyDisplay::Image {
                src,
                stage: self.reveal.stage(),
            },
            // Placeholder disabled or absent: neutral loading indicator.
            None => LazyDisplay::Loading,
        }
    }

    /// The artwork this consumer is bound to.
    #[must_use]
    pub const fn artwork_id(&self) -> &ArtworkId {
        &self.artwork_id
    }

    /// Whether the gate has fired.
    #[must_use]
    pub fn is_in_view(&self) -> bool {
        self.visibility.is_in_view()
    }
}

impl std::fmt::Debug for LazyArtwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyArtwork")
            .field("artwork_id", &self.artwork_id)
            .field("requested", &self.requested)
            .field("fetch_failed", &self.fetch_failed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::ports::mocks::MockArtworkSource;
    use crate::infrastructure::image::optimizer::{OptimizeOptions, ResultMemo};
    use crate::infrastructure::image::testing::png_data_uri;
    use crate::infrastructure::image::ProcessedImageCache;
    use crate::infrastructure::visibility::ManualVisibility;

    fn gated_artwork(
        source: Arc<MockArtworkSource>,
    ) -> (LazyArtwork, Arc<ManualVisibility>) {
        let visibility = Arc::new(ManualVisibility::new());
        let optimizer = ImageOptimizer::new(
            Arc::new(ProcessedImageCache::with_defaults()),
            ResultMemo::new(),
            OptimizeOptions::default(),
        );
        let (lazy, _events) = LazyArtwork::new(
            ArtworkId::new("artwork-1"),
            source,
            visibility.clone(),
            optimizer,
            RevealConfig::default(),
        );
        (lazy, visibility)
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_before_visibility() {
        let source = Arc::new(MockArtworkSource::new(png_data_uri(32, 32)));
        let (mut lazy, _visibility) = gated_artwork(source.clone());

        assert_eq!(lazy.display(), LazyDisplay::Waiting);

        // Give the gated future plenty of (paused) time; it must stay
        // parked without requesting anything.
        tokio::select! {
            () = lazy.run() => panic!("gate released without a visibility signal"),
            () = tokio::time::sleep(Duration::from_secs(5)) => {}
        }
        assert_eq!(source.fetch_count(), 0);
        assert_eq!(lazy.display(), LazyDisplay::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_triggers_fetch_exactly_once() {
        let source = Arc::new(MockArtworkSource::new(png_data_uri(32, 32)));
        let (mut lazy, visibility) = gated_artwork(source.clone());

        visibility.trigger();
        visibility.trigger();
        visibility.trigger();
        lazy.run().await;

        assert_eq!(source.fetch_count(), 1);
        assert!(matches!(
            lazy.display(),
            LazyDisplay::Image {
                stage: RevealStage::Full,
                ..
            }
        ));

        // Awaiting again after completion must not refetch either.
        lazy.run().await;
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_shows_failure_placeholder() {
        let source = Arc::new(MockArtworkSource::failing());
        let (mut lazy, visibility) = gated_artwork(source.clone());

        visibility.trigger();
        lazy.run().await;

        assert_eq!(source.fetch_count(), 1);
        assert_eq!(lazy.display(), LazyDisplay::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrupt_payload_is_contained_as_failure() {
        let source = Arc::new(MockArtworkSource::new(
            crate::infrastructure::image::testing::corrupt_data_uri(),
        ));
        let (mut lazy, visibility) = gated_artwork(source);

        visibility.trigger();
        lazy.run().await;

        assert_eq!(lazy.display(), LazyDisplay::Failed);
    }
}
