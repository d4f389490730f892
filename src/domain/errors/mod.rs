//! Domain error types.

mod source_error;
mod transform_error;

pub use source_error::{SourceError, SourceResult};
pub use transform_error::{TransformError, TransformResult};
