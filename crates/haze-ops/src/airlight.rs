//! Global atmospheric light estimation.
//!
//! The atmospheric light (airlight) is the color of the haze itself,
//! assumed constant over the image. The brightest fraction of the dark
//! channel marks the haziest regions; averaging the source colors at
//! those positions gives a robust estimate of the haze color.
//!
//! Selection runs as a counting sort over the 256 possible dark-channel
//! intensities: whole buckets are taken from 255 downward, and the bucket
//! that crosses the quota is split in row-major scan order so exactly
//! `floor(top_percent * H * W)` pixels contribute.
//! [`estimate_airlight_full_sort`] sorts every (intensity, position) pair
//! instead and exists to cross-validate the bucket walk.

use crate::guard::{ensure_channels, ensure_nonempty, ensure_same_dims, ensure_unit_range};
use crate::{HazeError, HazeResult};
use haze_core::Buffer;
use tracing::{debug, trace};

fn validate(
    image: &Buffer<u8>,
    dark: &Buffer<u8>,
    top_percent: f64,
    op: &str,
) -> HazeResult<usize> {
    ensure_nonempty(image, op)?;
    ensure_channels(image, 3, op)?;
    ensure_channels(dark, 1, op)?;
    ensure_same_dims(image, dark)?;
    ensure_unit_range(top_percent, "top_percent", op)?;

    let total = image.width() * image.height();
    let quota = (top_percent * total as f64).floor() as usize;
    if quota == 0 {
        return Err(HazeError::estimation(format!(
            "{op}: top_percent {top_percent} selects zero pixels from a {}x{} image",
            image.width(),
            image.height()
        )));
    }
    Ok(quota)
}

/// Estimates the atmospheric light from the brightest dark-channel pixels.
///
/// Selects exactly `floor(top_percent * H * W)` positions with the largest
/// dark-channel values via a counting sort and returns the per-channel
/// average of the source image colors there, on the 0-255 scale.
///
/// # Errors
///
/// - [`Estimation`](HazeError::Estimation) if the selection quota rounds
///   down to zero pixels
/// - [`DimensionMismatch`](HazeError::DimensionMismatch) if image and dark
///   channel differ in size
/// - [`Configuration`](HazeError::Configuration) for wrong channel counts
///   or `top_percent` outside (0, 1)
///
/// # Example
///
/// ```rust
/// use haze_core::Buffer;
/// use haze_ops::airlight::estimate_airlight;
///
/// let image = Buffer::from_data(2, 2, 3, vec![
///     250u8, 240, 230,   10, 10, 10,
///      10,  10,  10,     10, 10, 10,
/// ]).unwrap();
/// let dark = Buffer::from_data(2, 2, 1, vec![200u8, 10, 10, 10]).unwrap();
///
/// // Quota of one pixel: the brightest dark-channel position wins.
/// let a = estimate_airlight(&image, &dark, 0.25).unwrap();
/// assert_eq!(a, [250.0, 240.0, 230.0]);
/// ```
pub fn estimate_airlight(
    image: &Buffer<u8>,
    dark: &Buffer<u8>,
    top_percent: f64,
) -> HazeResult<[f64; 3]> {
    let quota = validate(image, dark, top_percent, "estimate_airlight")?;
    trace!(
        width = image.width(),
        height = image.height(),
        top_percent,
        quota,
        "estimate_airlight"
    );

    let mut histogram = [0usize; 256];
    for &v in dark.as_slice() {
        histogram[v as usize] += 1;
    }

    // Find the intensity whose bucket crosses the quota: everything above
    // `level` is taken whole, `from_level` pixels are taken from the
    // bucket itself (in scan order).
    let mut level = 255usize;
    let mut above = 0usize;
    while above + histogram[level] < quota {
        above += histogram[level];
        level -= 1;
    }
    let mut from_level = quota - above;
    debug!(level, from_level, "airlight selection threshold");

    let width = image.width();
    let mut sums = [0.0f64; 3];
    for (idx, &v) in dark.as_slice().iter().enumerate() {
        let v = v as usize;
        let selected = if v > level {
            true
        } else if v == level && from_level > 0 {
            from_level -= 1;
            true
        } else {
            false
        };
        if selected {
            let px = image.pixel(idx % width, idx / width);
            sums[0] += px[0] as f64;
            sums[1] += px[1] as f64;
            sums[2] += px[2] as f64;
        }
    }

    let n = quota as f64;
    Ok([sums[0] / n, sums[1] / n, sums[2] / n])
}

/// Full-sort reference for [`estimate_airlight`].
///
/// Sorts all (intensity, position) pairs by descending intensity with a
/// stable sort and averages the first `quota` source colors. Ties stay in
/// scan order, so this agrees with the bucket walk even when a bucket is
/// split; the guaranteed contract is agreement whenever no bucket
/// straddles the quota.
pub fn estimate_airlight_full_sort(
    image: &Buffer<u8>,
    dark: &Buffer<u8>,
    top_percent: f64,
) -> HazeResult<[f64; 3]> {
    let quota = validate(image, dark, top_percent, "estimate_airlight_full_sort")?;

    let mut pixels: Vec<(u8, usize)> = dark
        .as_slice()
        .iter()
        .enumerate()
        .map(|(idx, &v)| (v, idx))
        .collect();
    pixels.sort_by(|a, b| b.0.cmp(&a.0));

    let width = image.width();
    let mut sums = [0.0f64; 3];
    for &(_, idx) in pixels.iter().take(quota) {
        let px = image.pixel(idx % width, idx / width);
        sums[0] += px[0] as f64;
        sums[1] += px[1] as f64;
        sums[2] += px[2] as f64;
    }

    let n = quota as f64;
    Ok([sums[0] / n, sums[1] / n, sums[2] / n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn image_with_dark(colors: &[(u8, u8, u8)], dark: &[u8], width: usize) -> (Buffer<u8>, Buffer<u8>) {
        let height = dark.len() / width;
        let mut data = Vec::with_capacity(colors.len() * 3);
        for &(r, g, b) in colors {
            data.extend_from_slice(&[r, g, b]);
        }
        (
            Buffer::from_data(width, height, 3, data).unwrap(),
            Buffer::from_data(width, height, 1, dark.to_vec()).unwrap(),
        )
    }

    #[test]
    fn test_exact_mean_of_maximal_pixels() {
        // Exactly two pixels share the maximum dark value; quota = 2.
        let (image, dark) = image_with_dark(
            &[(100, 0, 0), (0, 100, 0), (0, 0, 100), (200, 200, 200)],
            &[255, 255, 10, 10],
            2,
        );
        let a = estimate_airlight(&image, &dark, 0.5).unwrap();
        assert_eq!(a, [50.0, 50.0, 0.0]);
    }

    #[test]
    fn test_single_pixel_quota() {
        // 2x2 dark map [[200, 10], [10, 10]], quota 1 -> color at (0, 0).
        let (image, dark) = image_with_dark(
            &[(9, 8, 7), (1, 1, 1), (2, 2, 2), (3, 3, 3)],
            &[200, 10, 10, 10],
            2,
        );
        let a = estimate_airlight(&image, &dark, 0.25).unwrap();
        assert_eq!(a, [9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_bucket_split_takes_scan_order() {
        // Quota 3 with four pixels at the same intensity: the first three
        // in scan order are taken.
        let (image, dark) = image_with_dark(
            &[(10, 10, 10), (20, 20, 20), (30, 30, 30), (90, 90, 90)],
            &[70, 70, 70, 70],
            2,
        );
        let a = estimate_airlight(&image, &dark, 0.76).unwrap();
        assert_relative_eq!(a[0], 20.0);
    }

    #[test]
    fn test_matches_full_sort() {
        // Distinct intensities: no bucket is split, both selection
        // algorithms must agree exactly.
        let mut colors = Vec::new();
        let mut dark = Vec::new();
        for i in 0..36u8 {
            colors.push((i.wrapping_mul(7), i.wrapping_mul(13), 255 - i));
            dark.push(i.wrapping_mul(5));
        }
        let (image, dark) = image_with_dark(&colors, &dark, 6);
        for top in [0.1, 0.25, 0.5, 0.9] {
            let bucket = estimate_airlight(&image, &dark, top).unwrap();
            let sorted = estimate_airlight_full_sort(&image, &dark, top).unwrap();
            for c in 0..3 {
                assert_relative_eq!(bucket[c], sorted[c]);
            }
        }
    }

    #[test]
    fn test_zero_quota_is_estimation_error() {
        let (image, dark) = image_with_dark(
            &[(1, 1, 1), (2, 2, 2), (3, 3, 3), (4, 4, 4)],
            &[1, 2, 3, 4],
            2,
        );
        assert!(matches!(
            estimate_airlight(&image, &dark, 0.2),
            Err(HazeError::Estimation(_))
        ));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let (image, dark) = image_with_dark(&[(1, 1, 1), (2, 2, 2)], &[1, 2], 2);
        assert!(estimate_airlight(&image, &dark, 1.0).is_err());
        assert!(estimate_airlight(&image, &dark, 0.0).is_err());

        let wrong_dark = Buffer::filled(3, 3, 1, 5u8);
        assert!(matches!(
            estimate_airlight(&image, &wrong_dark, 0.5),
            Err(HazeError::DimensionMismatch { .. })
        ));
    }
}
