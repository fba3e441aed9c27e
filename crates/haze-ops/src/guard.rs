//! Precondition guards for haze-removal operations.
//!
//! Every public operation validates its inputs at entry and surfaces the
//! first violated precondition as a [`HazeError`]. This module collects
//! the shared checks so the error messages stay uniform across operations.
//!
//! # Example
//!
//! ```rust,ignore
//! use haze_ops::guard::{ensure_channels, ensure_radius};
//!
//! ensure_channels(&image, 3, "dark_channel")?;
//! ensure_radius(radius, "dark_channel")?;
//! ```

use crate::{HazeError, HazeResult};
use haze_core::{Buffer, Sample};

/// Validates that a buffer has at least one pixel.
pub fn ensure_nonempty<T: Sample>(buf: &Buffer<T>, op: &str) -> HazeResult<()> {
    if buf.is_empty() {
        return Err(HazeError::configuration(format!(
            "{op}: input buffer is empty ({}x{})",
            buf.width(),
            buf.height()
        )));
    }
    Ok(())
}

/// Validates that a buffer carries exactly `expected` channels.
pub fn ensure_channels<T: Sample>(buf: &Buffer<T>, expected: usize, op: &str) -> HazeResult<()> {
    if buf.channels() != expected {
        return Err(HazeError::configuration(format!(
            "{op}: expected {expected}-channel buffer, got {}",
            buf.channels()
        )));
    }
    Ok(())
}

/// Validates that two buffers share width and height.
pub fn ensure_same_dims<A: Sample, B: Sample>(a: &Buffer<A>, b: &Buffer<B>) -> HazeResult<()> {
    if !a.same_dims(b) {
        return Err(HazeError::dimension_mismatch(a.dims(), b.dims()));
    }
    Ok(())
}

/// Validates that a window half-size is at least 1.
pub fn ensure_radius(radius: usize, op: &str) -> HazeResult<()> {
    if radius == 0 {
        return Err(HazeError::configuration(format!(
            "{op}: radius must be at least 1"
        )));
    }
    Ok(())
}

/// Validates that a scalar parameter is strictly positive.
pub fn ensure_positive(value: f64, name: &str, op: &str) -> HazeResult<()> {
    if !(value > 0.0) {
        return Err(HazeError::configuration(format!(
            "{op}: {name} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// Validates that a scalar parameter lies strictly inside (0, 1).
pub fn ensure_unit_range(value: f64, name: &str, op: &str) -> HazeResult<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(HazeError::configuration(format!(
            "{op}: {name} must lie in (0, 1), got {value}"
        )));
    }
    Ok(())
}
