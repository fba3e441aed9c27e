//! Windowed-mean (box filter) acceleration.
//!
//! [`box_mean`] computes, for every pixel, the arithmetic mean of the
//! `(2 * radius_h + 1) x (2 * radius_w + 1)` window centered on it, with
//! replicate-extended borders, in O(H * W) total work regardless of the
//! radii. The guided filter calls it six times per invocation, so this is
//! the hot path of the whole workspace.
//!
//! The acceleration keeps a one-dimensional column accumulator over the
//! padded width: each entry holds the vertical sum of the current
//! `kernel_h` rows for that column. A row of output is then produced by
//! sliding a horizontal running total across the accumulator, and moving
//! to the next row costs one subtract/add pass over the accumulator
//! instead of re-summing `kernel_h` rows.
//!
//! # Example
//!
//! ```rust
//! use haze_core::Buffer;
//! use haze_ops::boxfilter::box_mean;
//!
//! let src = Buffer::filled(16, 16, 1, 0.5f64);
//! let mean = box_mean(&src, 3, 3).unwrap();
//! assert!(mean.as_slice().iter().all(|&v| (v - 0.5).abs() < 1e-12));
//! ```

use crate::guard::{ensure_channels, ensure_nonempty, ensure_radius};
use crate::pad::replicate_pad;
use crate::HazeResult;
use haze_core::{Buffer, Plane};
use tracing::trace;

fn validate(src: &Plane, radius_h: usize, radius_w: usize, op: &str) -> HazeResult<()> {
    ensure_nonempty(src, op)?;
    ensure_channels(src, 1, op)?;
    ensure_radius(radius_h, op)?;
    ensure_radius(radius_w, op)?;
    Ok(())
}

/// Computes the replicate-padded windowed mean of a single-channel `f64`
/// buffer in O(H * W), independent of the window radii.
///
/// Every window sum is divided by the exact window area
/// `(2 * radius_h + 1) * (2 * radius_w + 1)`. Radii may exceed the image
/// half-size; replication defines the window content in all cases.
///
/// # Errors
///
/// [`Configuration`](crate::HazeError::Configuration) if the buffer is
/// empty or not single-channel, or if either radius is 0.
pub fn box_mean(src: &Plane, radius_h: usize, radius_w: usize) -> HazeResult<Plane> {
    validate(src, radius_h, radius_w, "box_mean")?;
    let (width, height) = src.dims();
    trace!(width, height, radius_h, radius_w, "box_mean");

    let kernel_h = 2 * radius_h + 1;
    let kernel_w = 2 * radius_w + 1;
    let padded = replicate_pad(src, radius_h, radius_w)?;
    let padded_width = padded.width();
    let pdata = padded.as_slice();

    // Vertical sums of the first kernel_h padded rows, one per padded column.
    let mut column = vec![0.0f64; padded_width];
    for row in pdata[..kernel_h * padded_width].chunks_exact(padded_width) {
        for (acc, &v) in column.iter_mut().zip(row) {
            *acc += v;
        }
    }

    let mut out = Buffer::new(width, height, 1);
    let odata = out.as_mut_slice();
    for y in 0..height {
        // First window of the row, then slide: drop the column leaving the
        // window, add the one entering it.
        let mut run: f64 = column[..kernel_w].iter().sum();
        odata[y * width] = run;
        for x in 1..width {
            run += column[x - 1 + kernel_w] - column[x - 1];
            odata[y * width + x] = run;
        }
        // Advance the column accumulator one row down.
        if y != height - 1 {
            let leaving = &pdata[y * padded_width..(y + 1) * padded_width];
            let entering = &pdata[(y + kernel_h) * padded_width..(y + kernel_h + 1) * padded_width];
            for ((acc, &up), &down) in column.iter_mut().zip(leaving).zip(entering) {
                *acc += down - up;
            }
        }
    }

    let area = (kernel_h * kernel_w) as f64;
    for v in odata.iter_mut() {
        *v /= area;
    }
    Ok(out)
}

/// Naive O(window area) windowed mean with identical replicate semantics.
///
/// Exists to cross-validate [`box_mean`]; both divide by the exact window
/// area, so on integer-valued data the two agree bit for bit.
pub fn box_mean_reference(src: &Plane, radius_h: usize, radius_w: usize) -> HazeResult<Plane> {
    validate(src, radius_h, radius_w, "box_mean_reference")?;
    let (width, height) = src.dims();

    let kernel_h = 2 * radius_h + 1;
    let kernel_w = 2 * radius_w + 1;
    let padded = replicate_pad(src, radius_h, radius_w)?;
    let area = (kernel_h * kernel_w) as f64;

    let mut out = Buffer::new(width, height, 1);
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for ky in 0..kernel_h {
                for kx in 0..kernel_w {
                    sum += padded.at(x + kx, y + ky, 0);
                }
            }
            out.set(x, y, 0, sum / area);
        }
    }
    Ok(out)
}
