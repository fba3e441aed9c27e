//! Dark channel extraction.
//!
//! The dark channel of a color image is its per-pixel channel minimum,
//! minimum-filtered over a square spatial window. Haze-free regions almost
//! always contain some pixel whose darkest channel is near zero; haze
//! lifts that floor, so the dark channel doubles as a per-window haze
//! estimate.
//!
//! The minimum filter runs as two separable passes (horizontal run
//! minimum, then vertical), each a direct O(window) scan per pixel.
//! [`dark_channel_reference`] performs the brute-force two-dimensional
//! scan instead and produces bit-identical output; it exists to validate
//! the separable scheme.

use crate::guard::{ensure_channels, ensure_nonempty, ensure_radius};
use crate::pad::replicate_pad;
use crate::HazeResult;
use haze_core::Buffer;
use tracing::trace;

/// Computes the dark channel of a 3-channel 8-bit image with a
/// `(2 * radius + 1)^2` minimum filter.
///
/// # Errors
///
/// [`Configuration`](crate::HazeError::Configuration) if the image is
/// empty or not 3-channel, or if `radius` is 0.
///
/// # Example
///
/// ```rust
/// use haze_core::Buffer;
/// use haze_ops::dark::dark_channel;
///
/// // A uniform gray image is its own dark channel.
/// let img = Buffer::filled(8, 8, 3, 130u8);
/// let dark = dark_channel(&img, 2).unwrap();
/// assert!(dark.as_slice().iter().all(|&v| v == 130));
/// ```
pub fn dark_channel(image: &Buffer<u8>, radius: usize) -> HazeResult<Buffer<u8>> {
    validate(image, radius, "dark_channel")?;
    trace!(
        width = image.width(),
        height = image.height(),
        radius,
        "dark_channel"
    );
    min_filter_separable(&channel_min(image), radius)
}

/// Brute-force dark channel: identical contract and output to
/// [`dark_channel`], scanning the full square window per pixel.
pub fn dark_channel_reference(image: &Buffer<u8>, radius: usize) -> HazeResult<Buffer<u8>> {
    validate(image, radius, "dark_channel_reference")?;
    min_filter_brute(&channel_min(image), radius)
}

fn validate(image: &Buffer<u8>, radius: usize, op: &str) -> HazeResult<()> {
    ensure_nonempty(image, op)?;
    ensure_channels(image, 3, op)?;
    ensure_radius(radius, op)?;
    Ok(())
}

/// Per-pixel minimum over the three channels.
fn channel_min(image: &Buffer<u8>) -> Buffer<u8> {
    let mut out = Buffer::new(image.width(), image.height(), 1);
    for (o, px) in out
        .as_mut_slice()
        .iter_mut()
        .zip(image.as_slice().chunks_exact(3))
    {
        *o = px[0].min(px[1]).min(px[2]);
    }
    out
}

/// Two-pass separable minimum filter with replicate borders.
fn min_filter_separable(src: &Buffer<u8>, radius: usize) -> HazeResult<Buffer<u8>> {
    let (width, height) = src.dims();
    let kernel = 2 * radius + 1;

    // Pass 1: horizontal run minimum.
    let padded = replicate_pad(src, 0, radius)?;
    let mut horizontal = Buffer::new(width, height, 1);
    for y in 0..height {
        let row = padded.row(y);
        for x in 0..width {
            let mut m = row[x];
            for t in 1..kernel {
                m = m.min(row[x + t]);
            }
            horizontal.set(x, y, 0, m);
        }
    }

    // Pass 2: vertical run minimum over the horizontal result.
    let padded = replicate_pad(&horizontal, radius, 0)?;
    let mut out = Buffer::new(width, height, 1);
    for x in 0..width {
        for y in 0..height {
            let mut m = padded.at(x, y, 0);
            for t in 1..kernel {
                m = m.min(padded.at(x, y + t, 0));
            }
            out.set(x, y, 0, m);
        }
    }
    Ok(out)
}

/// Direct square-window minimum filter, O(window area) per pixel.
fn min_filter_brute(src: &Buffer<u8>, radius: usize) -> HazeResult<Buffer<u8>> {
    let (width, height) = src.dims();
    let kernel = 2 * radius + 1;
    let padded = replicate_pad(src, radius, radius)?;

    let mut out = Buffer::new(width, height, 1);
    for y in 0..height {
        for x in 0..width {
            let mut m = u8::MAX;
            for ky in 0..kernel {
                for kx in 0..kernel {
                    m = m.min(padded.at(x + kx, y + ky, 0));
                }
            }
            out.set(x, y, 0, m);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random RGB image (multiplicative LCG).
    fn scrambled(width: usize, height: usize, mut seed: u64) -> Buffer<u8> {
        let data = (0..width * height * 3)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (seed >> 56) as u8
            })
            .collect();
        Buffer::from_data(width, height, 3, data).unwrap()
    }

    #[test]
    fn test_uniform_gray() {
        let img = Buffer::filled(10, 6, 3, 180u8);
        let dark = dark_channel(&img, 3).unwrap();
        assert!(dark.as_slice().iter().all(|&v| v == 180));
    }

    #[test]
    fn test_channel_minimum_taken() {
        // One low channel drags the whole dark channel down.
        let mut img = Buffer::filled(5, 5, 3, 200u8);
        for y in 0..5 {
            for x in 0..5 {
                img.set(x, y, 2, 35);
            }
        }
        let dark = dark_channel(&img, 1).unwrap();
        assert!(dark.as_slice().iter().all(|&v| v == 35));
    }

    #[test]
    fn test_dark_pixel_spreads_over_window() {
        let mut img = Buffer::filled(7, 7, 3, 250u8);
        img.set(3, 3, 1, 0);
        let dark = dark_channel(&img, 1).unwrap();
        for y in 0..7 {
            for x in 0..7 {
                let expect = if (2..=4).contains(&x) && (2..=4).contains(&y) {
                    0
                } else {
                    250
                };
                assert_eq!(dark.at(x, y, 0), expect);
            }
        }
    }

    #[test]
    fn test_separable_matches_brute_force() {
        for (w, h, radius) in [(16, 12, 1), (16, 12, 3), (9, 14, 5), (5, 5, 7)] {
            let img = scrambled(w, h, 0x9e3779b97f4a7c15);
            let fast = dark_channel(&img, radius).unwrap();
            let brute = dark_channel_reference(&img, radius).unwrap();
            assert_eq!(fast.as_slice(), brute.as_slice(), "radius {radius}");
        }
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let gray = Buffer::filled(4, 4, 1, 10u8);
        assert!(dark_channel(&gray, 1).is_err());
        let rgb = Buffer::filled(4, 4, 3, 10u8);
        assert!(dark_channel(&rgb, 0).is_err());
        let empty: Buffer<u8> = Buffer::new(0, 0, 3);
        assert!(dark_channel(&empty, 1).is_err());
    }
}
