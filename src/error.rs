use thiserror::Error;

/// Error returned by the merging and binning operations.
///
/// Every variant is a precondition violation detected before any
/// computation starts, so no partial result is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResampleError {
    /// Mismatched lengths or inconsistent channel widths across inputs.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Invalid input to the binner (length, ordering or bin count).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Edge placement mode outside of `"in"` and `"out"`.
    #[error("unsupported mode: {0:?}")]
    UnsupportedMode(String),
}

pub type Result<T> = std::result::Result<T, ResampleError>;
