//! Progressive reveal state machine.
//!
//! Drives the placeholder -> thumbnail -> full transition for one
//! completed optimization result. Each next stage is preloaded
//! off the render path before the swap, so the host never paints a
//! half-decoded source, and the full image is deliberately held back
//! for a short pause after the thumbnail lands.

use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{trace, warn};

use crate::domain::entities::{OptimizedImage, RevealEvent, RevealStage};
use crate::domain::errors::{TransformError, TransformResult};
use crate::infrastructure::config::RevealConfig;
use crate::infrastructure::image::transform;

/// Three-stage reveal driver for a single image source.
///
/// Transitions are monotonic; the only way back is [`reset`] when the
/// source itself changes.
///
/// [`reset`]: ProgressiveReveal::reset
#[derive(Debug)]
pub struct ProgressiveReveal {
    stage_tx: watch::Sender<RevealStage>,
    failed: bool,
    events: mpsc::UnboundedSender<RevealEvent>,
    config: RevealConfig,
}

impl ProgressiveReveal {
    /// Creates a reveal machine at the placeholder stage, returning the
    /// receiver for terminal load/error notifications.
    #[must_use]
    pub fn new(config: RevealConfig) -> (Self, mpsc::UnboundedReceiver<RevealEvent>) {
        let (stage_tx, _) = watch::channel(RevealStage::Placeholder);
        let (events, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                stage_tx,
                failed: false,
                events,
                config,
            },
            event_rx,
        )
    }

    /// Current visual stage.
    #[must_use]
    pub fn stage(&self) -> RevealStage {
        *self.stage_tx.borrow()
    }

    /// Subscribes to stage transitions.
    #[must_use]
    pub fn stages(&self) -> watch::Receiver<RevealStage> {
        self.stage_tx.subscribe()
    }

    /// Returns true once the reveal has entered its error display.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.failed
    }

    /// The source the host should render right now, or `None` for the
    /// neutral loading indicator (placeholder absent) or the failure
    /// placeholder (after an error).
    #[must_use]
    pub fn current_src<'a>(&self, image: &'a OptimizedImage) -> Option<&'a str> {
        if self.failed || image.failed() {
            return None;
        }
        match self.stage() {
            RevealStage::Placeholder => image.placeholder_url.as_deref(),
            RevealStage::Thumbnail => image.thumbnail_url.as_deref(),
            RevealStage::Full => image.optimized_url.as_deref(),
        }
    }

    /// Drives the staged transition for a completed result.
    ///
    /// A result still in flight leaves the machine at the placeholder;
    /// call again once optimization settles. A failed result, or any
    /// preload failure, lands in the error display and emits
    /// [`RevealEvent::Failed`].
    pub async fn run(&mut self, image: &OptimizedImage) {
        // Full is terminal: a re-run for the same source must not
        // re-preload or re-announce the load.
        if self.stage().is_full() {
            return;
        }
        if image.failed() {
            self.fail();
            return;
        }
        if image.is_optimizing || image.is_loading {
            return;
        }

        if let Some(thumb) = image.thumbnail_url.clone() {
            match preload_offscreen(thumb).await {
                Ok(()) => {
                    self.advance(RevealStage::Thumbnail);
                    trace!("Thumbnail stage revealed");
                }
                Err(e) => {
                    warn!(error = %e, "Thumbnail preload failed");
                    self.fail();
                    return;
                }
            }
        }

        // The thumbnail has satisfied the first impression; hold the
        // full-image decode back for a beat instead of competing with it.
        sleep(self.config.full_image_delay()).await;

        if let Some(full) = image.optimized_url.clone() {
            match preload_offscreen(full).await {
                Ok(()) => {
                    self.advance(RevealStage::Full);
                    trace!("Full stage revealed");
                    let _ = self.events.send(RevealEvent::Loaded);
                }
                Err(e) => {
                    warn!(error = %e, "Full image preload failed");
                    self.fail();
                }
            }
        }
    }

    /// Resets to the placeholder stage for a new source.
    pub fn reset(&mut self) {
        self.failed = false;
        self.stage_tx.send_replace(RevealStage::Placeholder);
    }

    /// Advances the stage, never backward.
    fn advance(&self, to: RevealStage) {
        self.stage_tx.send_if_modified(|stage| {
            if (*stage as u8) < (to as u8) {
                *stage = to;
                true
            } else {
                false
            }
        });
    }

    fn fail(&mut self) {
        self.failed = true;
        let _ = self.events.send(RevealEvent::Failed);
    }
}

/// Decode-verifies a staged source off the async runtime, the moral
/// equivalent of preloading into an off-screen element.
async fn preload_offscreen(src: String) -> TransformResult<()> {
    tokio::task::spawn_blocking(move || transform::preload(&src))
        .await
        .map_err(|e| TransformError::Task(e.to_string()))?
}
