use thiserror::Error;

/// Errors raised when constructing points and ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZSpaceError {
    #[error("Dimension mismatch: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("start {start} must be <= end {end}")]
    StartAfterEnd { start: String, end: String },

    #[error("Invalid ZRange: {0:?}")]
    Parse(String),

    #[error("Coordinate overflow: {0}")]
    Overflow(String),
}

pub type ZSpaceResult<T> = Result<T, ZSpaceError>;
