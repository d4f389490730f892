//! Optimization result and state types.

/// Result of running a raw artwork payload through the optimization
/// pipeline. Every URL is a data URI; absent fields were either disabled
/// in the options or not yet produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizedImage {
    /// The raw payload exactly as supplied.
    pub original_url: Option<String>,
    /// Recompressed full-size rendition.
    pub optimized_url: Option<String>,
    /// Small thumbnail rendition.
    pub thumbnail_url: Option<String>,
    /// Tiny blurred placeholder rendition.
    pub placeholder_url: Option<String>,
    /// True while any pipeline work is in flight.
    pub is_loading: bool,
    /// True while the transform engine is running.
    pub is_optimizing: bool,
    /// Fixed user-facing message when optimization failed.
    pub error: Option<String>,
}

impl OptimizedImage {
    /// The result for an absent payload: everything absent, no flags set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true once a full-size rendition is available and nothing
    /// is still in flight.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.optimized_url.is_some() && !self.is_loading && self.error.is_none()
    }

    /// Returns true if optimization failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Observable state of the optimization pipeline for one payload.
///
/// Transitions are `Empty -> Checking -> Processing -> Ready` on the
/// normal path, with `Checking -> Ready` on a cache hit and any
/// processing failure landing in `Error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OptimizeState {
    /// No payload supplied.
    #[default]
    Empty,
    /// Consulting the caches before doing any work.
    Checking,
    /// Transform tasks are running.
    Processing,
    /// All renditions resolved.
    Ready(OptimizedImage),
    /// Optimization failed with a user-facing message.
    Error(String),
}

impl OptimizeState {
    /// Returns true if the pipeline has produced its renditions.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns true while work is in flight.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Checking | Self::Processing)
    }

    /// Returns true if optimization failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
