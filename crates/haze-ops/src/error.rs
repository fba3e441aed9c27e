//! Error types for haze-removal operations.

use thiserror::Error;

/// Error type for haze-removal operations.
///
/// Every operation checks its preconditions on entry and fails
/// immediately; nothing is retried and no partial results are returned.
#[derive(Error, Debug)]
pub enum HazeError {
    /// Two buffers expected to share a size do not.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First buffer width
        a_width: usize,
        /// First buffer height
        a_height: usize,
        /// Second buffer width
        b_width: usize,
        /// Second buffer height
        b_height: usize,
    },

    /// A parameter is outside its valid range (zero radius, non-positive
    /// regularization, channel count the operation cannot process, empty
    /// input).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A global estimate could not be formed (e.g. the top-percentile
    /// selection quota rounds down to zero pixels).
    #[error("estimation failed: {0}")]
    Estimation(String),
}

impl HazeError {
    /// Creates a [`HazeError::DimensionMismatch`] from two `(width, height)`
    /// pairs.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates a [`HazeError::Configuration`] error.
    #[inline]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a [`HazeError::Estimation`] error.
    #[inline]
    pub fn estimation(msg: impl Into<String>) -> Self {
        Self::Estimation(msg.into())
    }
}

impl From<haze_core::Error> for HazeError {
    fn from(err: haze_core::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for haze-removal operations.
pub type HazeResult<T> = Result<T, HazeError>;
