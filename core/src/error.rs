//! Error types.

use thiserror::Error;

/// Construction-time failures. These surface before any rendering work
/// begins; per-sample numerical problems are recovered locally instead and
/// never reported through this type.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// The input image has no rows or no columns.
    #[error("image must have at least one row and one column")]
    EmptyImage,

    /// The input image rows are not all the same length.
    #[error("image rows have inconsistent lengths")]
    RaggedImage,

    /// A film was created with a zero dimension.
    #[error("film resolution must be greater than zero in both dimensions")]
    ZeroResolution,

    /// The camera orientation vectors do not span a basis.
    #[error("camera look direction and up vector are degenerate")]
    DegenerateCameraBasis,
}
