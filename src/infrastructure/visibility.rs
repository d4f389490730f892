//! Visibility adapters.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::trace;

use crate::domain::ports::VisibilityPort;

/// Manually triggered visibility observer.
///
/// Hosts with a real intersection primitive call [`trigger`] from its
/// callback; non-visual hosts and tests call it directly. The first
/// trigger flips the observer irreversibly to "in view"; every later
/// trigger is a no-op.
///
/// [`trigger`]: ManualVisibility::trigger
#[derive(Debug)]
pub struct ManualVisibility {
    entered: watch::Sender<bool>,
}

impl ManualVisibility {
    /// Creates an observer that has not yet seen its container.
    #[must_use]
    pub fn new() -> Self {
        let (entered, _) = watch::channel(false);
        Self { entered }
    }

    /// Signals that the container entered the expanded viewport.
    /// Returns true only on the first call.
    pub fn trigger(&self) -> bool {
        let flipped = self.entered.send_if_modified(|in_view| {
            if *in_view {
                false
            } else {
                *in_view = true;
                true
            }
        });
        if flipped {
            trace!("Container entered viewport");
        }
        flipped
    }
}

impl Default for ManualVisibility {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisibilityPort for ManualVisibility {
    async fn entered(&self, _margin_px: u32, _threshold: f32) {
        // The manual adapter has no geometry; margin and threshold are
        // honored by whoever calls trigger().
        let mut rx = self.entered.subscribe();
        let _ = rx.wait_for(|in_view| *in_view).await;
    }

    fn is_in_view(&self) -> bool {
        *self.entered.borrow()
    }
}
