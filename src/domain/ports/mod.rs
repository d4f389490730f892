mod artwork_source_port;
mod visibility_port;

pub use artwork_source_port::ArtworkSourcePort;
pub use visibility_port::VisibilityPort;

#[cfg(test)]
pub mod mocks {
    //! Hand-rolled port mocks shared across test modules.
    pub use super::artwork_source_port::mock::MockArtworkSource;
}
