//! Guided filtering.
//!
//! The guided filter fits, in every window, a local linear model
//! `q = a * I + b` from a guide buffer `I` to a target buffer `P`, then
//! averages the per-window coefficients so each pixel blends every window
//! that covers it. Guiding a buffer by itself smooths it while preserving
//! edges (denoising); guiding by a different buffer transfers the guide's
//! structure onto the target (detail/cross-modal transfer, transmission
//! refinement).
//!
//! Three entry points:
//!
//! - [`guided_filter`] - single-channel target, single-channel guide
//! - [`guided_filter_rgb`] - 3-channel target, per-channel application
//! - [`guided_filter_color_guide`] - single-channel target, 3-channel
//!   guide solving the full 3x3 windowed covariance system
//!
//! All statistics come from [`box_mean`](crate::boxfilter::box_mean), so
//! the cost is O(H * W) regardless of the radii. Arithmetic runs in `f64`
//! on [0, 1]-normalized samples and quantizes once at the output write.
//!
//! # Example
//!
//! ```rust
//! use haze_core::Buffer;
//! use haze_ops::guided::guided_filter;
//!
//! let noisy = Buffer::filled(8, 8, 1, 100u8);
//! let smoothed = guided_filter(&noisy, &noisy, 2, 2, 0.01).unwrap();
//! assert!(smoothed.as_slice().iter().all(|&v| v == 100));
//! ```

use crate::boxfilter::box_mean;
use crate::guard::{ensure_channels, ensure_nonempty, ensure_positive, ensure_radius, ensure_same_dims};
use crate::{HazeError, HazeResult};
use haze_core::{Buffer, Plane, Sample};
use tracing::trace;

fn validate_params(
    target: &Buffer<u8>,
    guide: &Buffer<u8>,
    radius_h: usize,
    radius_w: usize,
    eta: f64,
    op: &str,
) -> HazeResult<()> {
    ensure_nonempty(target, op)?;
    ensure_same_dims(target, guide)?;
    ensure_radius(radius_h, op)?;
    ensure_radius(radius_w, op)?;
    ensure_positive(eta, "eta", op)?;
    Ok(())
}

/// Elementwise combination of two equally sized planes.
fn zip_map(a: &Plane, b: &Plane, f: impl Fn(f64, f64) -> f64) -> Plane {
    debug_assert!(a.same_dims(b));
    let mut out = Buffer::new(a.width(), a.height(), 1);
    for ((o, &x), &y) in out.as_mut_slice().iter_mut().zip(a.as_slice()).zip(b.as_slice()) {
        *o = f(x, y);
    }
    out
}

/// Edge-preserving locally-linear transform of `target` driven by `guide`.
///
/// Both buffers must be same-size and single-channel. Passing
/// `guide = target` yields edge-preserving denoising. `eta` regularizes
/// the per-window regression: small values preserve structure, large
/// values push the result toward the plain windowed mean of `target`.
///
/// # Errors
///
/// - [`DimensionMismatch`](HazeError::DimensionMismatch) if the buffers
///   differ in size
/// - [`Configuration`](HazeError::Configuration) if either buffer is not
///   single-channel, a radius is 0, or `eta <= 0`
pub fn guided_filter(
    target: &Buffer<u8>,
    guide: &Buffer<u8>,
    radius_h: usize,
    radius_w: usize,
    eta: f64,
) -> HazeResult<Buffer<u8>> {
    const OP: &str = "guided_filter";
    validate_params(target, guide, radius_h, radius_w, eta, OP)?;
    ensure_channels(target, 1, OP)?;
    ensure_channels(guide, 1, OP)?;
    let (width, height) = target.dims();
    trace!(width, height, radius_h, radius_w, eta, "guided_filter");

    let p = target.normalized();
    let i = guide.normalized();

    let mean_p = box_mean(&p, radius_h, radius_w)?;
    let mean_i = box_mean(&i, radius_h, radius_w)?;
    let mean_ip = box_mean(&zip_map(&i, &p, |x, y| x * y), radius_h, radius_w)?;
    let mean_ii = box_mean(&zip_map(&i, &i, |x, y| x * y), radius_h, radius_w)?;

    // a = cov(I, P) / (var(I) + eta), b = mean(P) - a * mean(I)
    let mut a = Buffer::new(width, height, 1);
    let mut b = Buffer::new(width, height, 1);
    {
        let (a_data, b_data) = (a.as_mut_slice(), b.as_mut_slice());
        for idx in 0..width * height {
            let mi = mean_i.as_slice()[idx];
            let mp = mean_p.as_slice()[idx];
            let cov_ip = mean_ip.as_slice()[idx] - mi * mp;
            let var_i = mean_ii.as_slice()[idx] - mi * mi;
            let ak = cov_ip / (var_i + eta);
            a_data[idx] = ak;
            b_data[idx] = mp - ak * mi;
        }
    }

    // Each pixel sits in many windows; average every window's estimate.
    let mean_a = box_mean(&a, radius_h, radius_w)?;
    let mean_b = box_mean(&b, radius_h, radius_w)?;

    let mut out = Buffer::new(width, height, 1);
    for (idx, o) in out.as_mut_slice().iter_mut().enumerate() {
        let q = mean_a.as_slice()[idx] * i.as_slice()[idx] + mean_b.as_slice()[idx];
        *o = u8::from_real(q);
    }
    Ok(out)
}

/// Per-channel guided filtering of a 3-channel target.
///
/// The guide may be single-channel (the same guide drives every target
/// channel) or 3-channel (channel `c` guides channel `c`). Self-guided
/// invocation (`guide = target`) denoises each channel independently.
///
/// # Errors
///
/// As [`guided_filter`], plus [`Configuration`](HazeError::Configuration)
/// if the target is not 3-channel or the guide channel count is not 1
/// or 3.
pub fn guided_filter_rgb(
    target: &Buffer<u8>,
    guide: &Buffer<u8>,
    radius_h: usize,
    radius_w: usize,
    eta: f64,
) -> HazeResult<Buffer<u8>> {
    const OP: &str = "guided_filter_rgb";
    validate_params(target, guide, radius_h, radius_w, eta, OP)?;
    ensure_channels(target, 3, OP)?;
    if guide.channels() != 1 && guide.channels() != 3 {
        return Err(HazeError::configuration(format!(
            "{OP}: guide must have 1 or 3 channels, got {}",
            guide.channels()
        )));
    }

    // A single-channel guide drives all three target channels.
    let guide_channel = |c: usize| if guide.channels() == 3 { c } else { 0 };
    let filtered = [
        guided_filter(
            &extract_channel(target, 0),
            &extract_channel(guide, guide_channel(0)),
            radius_h,
            radius_w,
            eta,
        )?,
        guided_filter(
            &extract_channel(target, 1),
            &extract_channel(guide, guide_channel(1)),
            radius_h,
            radius_w,
            eta,
        )?,
        guided_filter(
            &extract_channel(target, 2),
            &extract_channel(guide, guide_channel(2)),
            radius_h,
            radius_w,
            eta,
        )?,
    ];
    Ok(merge_rgb(&filtered))
}

/// Guided filtering of a single-channel target with a 3-channel guide.
///
/// Instead of the scalar regression, every window solves the 3x3 system
///
/// ```text
/// (Sigma + eta * E3) a = cov(I, p)
/// b = mean(p) - a . mean(I)
/// ```
///
/// where `Sigma` is the windowed covariance matrix of the guide channels.
/// `Sigma + eta * E3` is symmetric positive definite for `eta > 0`, so the
/// explicit adjugate inverse is well defined. The coefficient vector and
/// offset are box-averaged before composing
/// `q = mean_a . I + mean_b`.
///
/// # Errors
///
/// As [`guided_filter`], with the channel requirements swapped: the
/// target must be single-channel and the guide 3-channel.
pub fn guided_filter_color_guide(
    target: &Buffer<u8>,
    guide: &Buffer<u8>,
    radius_h: usize,
    radius_w: usize,
    eta: f64,
) -> HazeResult<Buffer<u8>> {
    const OP: &str = "guided_filter_color_guide";
    validate_params(target, guide, radius_h, radius_w, eta, OP)?;
    ensure_channels(target, 1, OP)?;
    ensure_channels(guide, 3, OP)?;
    let (width, height) = target.dims();
    trace!(width, height, radius_h, radius_w, eta, "guided_filter_color_guide");

    let p = target.normalized();
    let g: [Plane; 3] = [
        extract_channel(guide, 0).normalized(),
        extract_channel(guide, 1).normalized(),
        extract_channel(guide, 2).normalized(),
    ];

    let mean_p = box_mean(&p, radius_h, radius_w)?;
    let mean_g = [
        box_mean(&g[0], radius_h, radius_w)?,
        box_mean(&g[1], radius_h, radius_w)?,
        box_mean(&g[2], radius_h, radius_w)?,
    ];

    // Windowed second moments: the six unique entries of the symmetric
    // guide covariance, and the three guide/target cross terms.
    let mut var = Vec::with_capacity(6);
    for (ci, cj) in [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)] {
        let mean_gg = box_mean(&zip_map(&g[ci], &g[cj], |x, y| x * y), radius_h, radius_w)?;
        var.push(zip_map3(&mean_gg, &mean_g[ci], &mean_g[cj], |m, a, b| m - a * b));
    }
    let mut cov = Vec::with_capacity(3);
    for c in 0..3 {
        let mean_gp = box_mean(&zip_map(&g[c], &p, |x, y| x * y), radius_h, radius_w)?;
        cov.push(zip_map3(&mean_gp, &mean_g[c], &mean_p, |m, a, b| m - a * b));
    }

    let mut a: [Plane; 3] = [
        Buffer::new(width, height, 1),
        Buffer::new(width, height, 1),
        Buffer::new(width, height, 1),
    ];
    let mut b = Buffer::new(width, height, 1);
    for idx in 0..width * height {
        let m00 = var[0].as_slice()[idx] + eta;
        let m01 = var[1].as_slice()[idx];
        let m02 = var[2].as_slice()[idx];
        let m11 = var[3].as_slice()[idx] + eta;
        let m12 = var[4].as_slice()[idx];
        let m22 = var[5].as_slice()[idx] + eta;

        // Adjugate inverse of the regularized symmetric 3x3 matrix.
        let c00 = m11 * m22 - m12 * m12;
        let c01 = m02 * m12 - m01 * m22;
        let c02 = m01 * m12 - m02 * m11;
        let c11 = m00 * m22 - m02 * m02;
        let c12 = m01 * m02 - m00 * m12;
        let c22 = m00 * m11 - m01 * m01;
        let det = m00 * c00 + m01 * c01 + m02 * c02;

        let v0 = cov[0].as_slice()[idx];
        let v1 = cov[1].as_slice()[idx];
        let v2 = cov[2].as_slice()[idx];
        let a0 = (c00 * v0 + c01 * v1 + c02 * v2) / det;
        let a1 = (c01 * v0 + c11 * v1 + c12 * v2) / det;
        let a2 = (c02 * v0 + c12 * v1 + c22 * v2) / det;

        a[0].as_mut_slice()[idx] = a0;
        a[1].as_mut_slice()[idx] = a1;
        a[2].as_mut_slice()[idx] = a2;
        b.as_mut_slice()[idx] = mean_p.as_slice()[idx]
            - a0 * mean_g[0].as_slice()[idx]
            - a1 * mean_g[1].as_slice()[idx]
            - a2 * mean_g[2].as_slice()[idx];
    }

    let mean_a = [
        box_mean(&a[0], radius_h, radius_w)?,
        box_mean(&a[1], radius_h, radius_w)?,
        box_mean(&a[2], radius_h, radius_w)?,
    ];
    let mean_b = box_mean(&b, radius_h, radius_w)?;

    let mut out = Buffer::new(width, height, 1);
    for (idx, o) in out.as_mut_slice().iter_mut().enumerate() {
        let q = mean_a[0].as_slice()[idx] * g[0].as_slice()[idx]
            + mean_a[1].as_slice()[idx] * g[1].as_slice()[idx]
            + mean_a[2].as_slice()[idx] * g[2].as_slice()[idx]
            + mean_b.as_slice()[idx];
        *o = u8::from_real(q);
    }
    Ok(out)
}

fn zip_map3(a: &Plane, b: &Plane, c: &Plane, f: impl Fn(f64, f64, f64) -> f64) -> Plane {
    let mut out = Buffer::new(a.width(), a.height(), 1);
    for (idx, o) in out.as_mut_slice().iter_mut().enumerate() {
        *o = f(a.as_slice()[idx], b.as_slice()[idx], c.as_slice()[idx]);
    }
    out
}

fn extract_channel(src: &Buffer<u8>, c: usize) -> Buffer<u8> {
    let mut out = Buffer::new(src.width(), src.height(), 1);
    for y in 0..src.height() {
        for x in 0..src.width() {
            out.set(x, y, 0, src.at(x, y, c));
        }
    }
    out
}

fn merge_rgb(channels: &[Buffer<u8>; 3]) -> Buffer<u8> {
    let (width, height) = channels[0].dims();
    let mut out = Buffer::new(width, height, 3);
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                out.set(x, y, c, channels[c].at(x, y, 0));
            }
        }
    }
    out
}
