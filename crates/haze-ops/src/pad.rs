//! Replicate border extension.
//!
//! Windowed operations near the image border need values outside the
//! image. Everything in this workspace uses edge replication: a border
//! pixel takes the value of the nearest interior pixel, and corners take
//! the nearest corner pixel. The interior of the padded buffer is an
//! exact copy of the source at offset `(pad_h, pad_w)`.

use crate::guard::ensure_nonempty;
use crate::HazeResult;
use haze_core::{Buffer, Sample};

/// Replicate-pads a buffer by `pad_h` rows on top and bottom and `pad_w`
/// columns on the left and right.
///
/// The output is `(height + 2 * pad_h) x (width + 2 * pad_w)` with the
/// same channel count. Zero margins return a plain copy.
///
/// # Errors
///
/// [`Configuration`](crate::HazeError::Configuration) if the source has no
/// pixels to replicate.
///
/// # Example
///
/// ```rust
/// use haze_core::Buffer;
/// use haze_ops::pad::replicate_pad;
///
/// let src = Buffer::from_data(2, 1, 1, vec![3u8, 8]).unwrap();
/// let padded = replicate_pad(&src, 1, 1).unwrap();
/// assert_eq!(padded.dims(), (4, 3));
/// // Each row replicates the single source row; columns clamp to the edges.
/// assert_eq!(padded.row(0), &[3, 3, 8, 8]);
/// assert_eq!(padded.row(2), &[3, 3, 8, 8]);
/// ```
pub fn replicate_pad<T: Sample>(
    src: &Buffer<T>,
    pad_h: usize,
    pad_w: usize,
) -> HazeResult<Buffer<T>> {
    ensure_nonempty(src, "replicate_pad")?;

    let (width, height) = src.dims();
    let channels = src.channels();
    let mut out = Buffer::new(width + 2 * pad_w, height + 2 * pad_h, channels);

    for y in 0..out.height() {
        let sy = y.saturating_sub(pad_h).min(height - 1);
        for x in 0..out.width() {
            let sx = x.saturating_sub(pad_w).min(width - 1);
            for c in 0..channels {
                out.set(x, y, c, src.at(sx, sy, c));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_is_exact_copy() {
        let src = Buffer::from_data(3, 2, 1, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        let padded = replicate_pad(&src, 2, 1).unwrap();
        assert_eq!(padded.dims(), (5, 6));
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(padded.at(x + 1, y + 2, 0), src.at(x, y, 0));
            }
        }
    }

    #[test]
    fn test_edges_replicate() {
        let src = Buffer::from_data(2, 2, 1, vec![1u8, 2, 3, 4]).unwrap();
        let padded = replicate_pad(&src, 1, 2).unwrap();
        // Top row replicates the first source row
        assert_eq!(padded.row(0), &[1, 1, 1, 2, 2, 2]);
        // Bottom row replicates the last source row
        assert_eq!(padded.row(2), &[3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn test_corners_replicate_nearest_corner() {
        let src = Buffer::from_data(2, 2, 1, vec![10u8, 20, 30, 40]).unwrap();
        let padded = replicate_pad(&src, 2, 2).unwrap();
        assert_eq!(padded.at(0, 0, 0), 10);
        assert_eq!(padded.at(5, 0, 0), 20);
        assert_eq!(padded.at(0, 5, 0), 30);
        assert_eq!(padded.at(5, 5, 0), 40);
    }

    #[test]
    fn test_multichannel() {
        let src = Buffer::from_data(1, 1, 3, vec![7u8, 8, 9]).unwrap();
        let padded = replicate_pad(&src, 1, 1).unwrap();
        assert_eq!(padded.pixel(0, 0), &[7, 8, 9]);
        assert_eq!(padded.pixel(2, 2), &[7, 8, 9]);
    }

    #[test]
    fn test_zero_margins_copy() {
        let src = Buffer::from_data(2, 2, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let padded = replicate_pad(&src, 0, 0).unwrap();
        assert_eq!(padded.as_slice(), src.as_slice());
    }

    #[test]
    fn test_empty_rejected() {
        let empty: Buffer<u8> = Buffer::new(0, 3, 1);
        assert!(replicate_pad(&empty, 1, 1).is_err());
    }

    #[test]
    fn test_pad_larger_than_image() {
        let src = Buffer::from_data(1, 1, 1, vec![42u8]).unwrap();
        let padded = replicate_pad(&src, 5, 5).unwrap();
        assert_eq!(padded.dims(), (11, 11));
        assert!(padded.as_slice().iter().all(|&v| v == 42));
    }
}
