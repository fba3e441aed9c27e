//! Error types for haze-core buffer operations.
//!
//! The [`Error`] enum covers the failure modes of buffer construction and
//! access: dimension validation, bounds checking, and channel-count
//! mismatches. Higher-level algorithm errors live in `haze-ops`.
//!
//! # Usage
//!
//! ```rust
//! use haze_core::{Error, Result};
//!
//! fn check_access(x: usize, y: usize, width: usize, height: usize) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing or accessing pixel buffers.
///
/// This enum uses [`thiserror`] for automatic [`std::error::Error`] and
/// [`std::fmt::Display`] implementations.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside buffer bounds.
    ///
    /// Returned when accessing a pixel at (x, y) where `x >= width` or
    /// `y >= height`.
    #[error("pixel ({x}, {y}) out of bounds for buffer {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: usize,
        /// Y coordinate that was out of bounds
        y: usize,
        /// Buffer width
        width: usize,
        /// Buffer height
        height: usize,
    },

    /// Buffer dimensions don't match the supplied data.
    ///
    /// Returned when constructing a buffer from existing data whose length
    /// is not `width * height * channels`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Channel count doesn't match what the operation requires.
    ///
    /// Returned by conversions that only make sense for a fixed channel
    /// count (e.g. luma reduction of a 3-channel buffer).
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch {
        /// Expected channel count
        expected: usize,
        /// Actual channel count
        got: usize,
    },
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: usize, height: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::ChannelMismatch`] error.
    #[inline]
    pub fn channel_mismatch(expected: usize, got: usize) -> Self {
        Self::ChannelMismatch { expected, got }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}
