//! Staged reveal types.

/// Visual stage of the progressive reveal. Transitions are monotonic:
/// a source never moves backward except through a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealStage {
    /// Tiny blurred placeholder, shown immediately.
    #[default]
    Placeholder,
    /// Small thumbnail, shown once its bytes are decoded.
    Thumbnail,
    /// Full-size rendition.
    Full,
}

impl RevealStage {
    /// Presentation opacity for this stage.
    #[must_use]
    pub const fn opacity(self) -> f32 {
        match self {
            Self::Placeholder => 0.6,
            Self::Thumbnail => 0.8,
            Self::Full => 1.0,
        }
    }

    /// Presentation scale factor for this stage. Earlier stages render
    /// slightly oversized so the final swap settles into place.
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::Placeholder => 1.10,
            Self::Thumbnail => 1.05,
            Self::Full => 1.0,
        }
    }

    /// Whether this stage renders with a blur applied.
    #[must_use]
    pub const fn is_blurred(self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Returns true once the full-size rendition is showing.
    #[must_use]
    pub const fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Terminal notification emitted by the reveal component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent {
    /// The full-size rendition was decoded and is now showing.
    Loaded,
    /// A rendition failed to preload; the failure placeholder shows.
    Failed,
}
