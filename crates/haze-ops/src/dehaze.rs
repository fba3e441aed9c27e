//! Single-image haze removal via the dark-channel prior.
//!
//! The haze model is `I(x) = J(x) t(x) + A (1 - t(x))`: the observed
//! image `I` mixes the true scene radiance `J` with the atmospheric
//! light `A` according to the per-pixel transmission `t`. The pipeline
//! estimates `A` from the dark channel, derives `t` per channel, and
//! inverts the model:
//!
//! 1. dark channel of `I` ([`dark_channel`])
//! 2. atmospheric light from the brightest dark-channel fraction
//!    ([`estimate_airlight`])
//! 3. [`transmission_maps`]: `t_c(x) = 1 - omega * dark(x) / A_c`,
//!    clamped to at least `t0`
//! 4. [`recover_radiance`]:
//!    `J_c(x) = saturate((I_c(x) - A_c) / t_c(x) + A_c)`
//! 5. optionally, refine each transmission map with the guided filter
//!    against the luma of `I` and recover again
//!
//! Steps 3 and 4 are public so callers with a known atmospheric light can
//! skip the estimators. Every intermediate is returned in
//! [`DehazeOutput`] so callers can inspect the dark channel, both
//! transmission map sets, and both recovered images.
//!
//! # Example
//!
//! ```rust
//! use haze_core::Buffer;
//! use haze_ops::dehaze::{dehaze, DehazeConfig};
//!
//! let hazy = Buffer::filled(32, 32, 3, 140u8);
//! let config = DehazeConfig {
//!     top_percent: 0.01,
//!     ..DehazeConfig::default()
//! };
//! let out = dehaze(&hazy, &config).unwrap();
//! assert_eq!(out.recovered.dims(), (32, 32));
//! assert!(out.recovered_refined.is_some());
//! ```

use crate::airlight::estimate_airlight;
use crate::dark::dark_channel;
use crate::guard::{
    ensure_channels, ensure_nonempty, ensure_positive, ensure_radius, ensure_same_dims,
    ensure_unit_range,
};
use crate::guided::guided_filter;
use crate::{HazeError, HazeResult};
use haze_core::{saturate_u8, Buffer, Plane};
use tracing::debug;

/// Parameters of the dehazing pipeline.
///
/// The defaults reproduce the standard single-image configuration:
/// a 15x15 dark-channel window, the top 0.1% of dark pixels for the
/// airlight, 5% haze retained for depth perception, and guided
/// refinement with a 25x25 window.
#[derive(Debug, Clone)]
pub struct DehazeConfig {
    /// Half-size of the dark-channel minimum-filter window.
    pub dark_radius: usize,
    /// Fraction of brightest dark-channel pixels averaged into the
    /// atmospheric light, in (0, 1).
    pub top_percent: f64,
    /// Single-scattering weight in (0, 1]; values below 1 keep a little
    /// haze so distant objects still read as distant.
    pub omega: f64,
    /// Lower transmission bound in (0, 1); prevents division blow-up in
    /// dense haze.
    pub t0: f64,
    /// Whether to refine the transmission maps with the guided filter.
    pub refine: bool,
    /// Guided-filter window half-size for refinement.
    pub refine_radius: usize,
    /// Guided-filter regularization for refinement.
    pub refine_eta: f64,
}

impl Default for DehazeConfig {
    fn default() -> Self {
        Self {
            dark_radius: 7,
            top_percent: 0.001,
            omega: 0.95,
            t0: 0.1,
            refine: true,
            refine_radius: 12,
            refine_eta: 1e-4,
        }
    }
}

impl DehazeConfig {
    fn validate(&self) -> HazeResult<()> {
        const OP: &str = "dehaze";
        ensure_radius(self.dark_radius, OP)?;
        ensure_unit_range(self.top_percent, "top_percent", OP)?;
        ensure_unit_range(self.t0, "t0", OP)?;
        ensure_omega(self.omega, OP)?;
        if self.refine {
            ensure_radius(self.refine_radius, OP)?;
            ensure_positive(self.refine_eta, "refine_eta", OP)?;
        }
        Ok(())
    }
}

fn ensure_omega(omega: f64, op: &str) -> HazeResult<()> {
    if !(omega > 0.0 && omega <= 1.0) {
        return Err(HazeError::configuration(format!(
            "{op}: omega must lie in (0, 1], got {omega}"
        )));
    }
    Ok(())
}

/// Everything the pipeline produces, for inspection as much as for the
/// final answer.
#[derive(Debug)]
pub struct DehazeOutput {
    /// Minimum-filtered dark channel of the input.
    pub dark_channel: Buffer<u8>,
    /// Estimated atmospheric light per channel, 0-255 scale.
    pub airlight: [f64; 3],
    /// Raw per-channel transmission maps, quantized to 8 bits.
    pub transmission: [Buffer<u8>; 3],
    /// Radiance recovered from the raw transmission maps.
    pub recovered: Buffer<u8>,
    /// Guided-refined transmission maps, when refinement ran.
    pub refined_transmission: Option<[Buffer<u8>; 3]>,
    /// Radiance recovered from the refined maps, when refinement ran.
    pub recovered_refined: Option<Buffer<u8>>,
}

/// Derives the per-channel transmission maps from a dark channel and a
/// known atmospheric light.
///
/// `t_c(x) = 1 - omega * dark(x) / A_c`, then clamped to at least `t0`
/// (after the formula, never before). Values never exceed 1 because the
/// dark channel is non-negative.
///
/// # Errors
///
/// [`Configuration`](HazeError::Configuration) if the dark channel is
/// empty or not single-channel, `omega` is outside (0, 1], `t0` is
/// outside (0, 1), or any airlight channel is not positive.
pub fn transmission_maps(
    dark: &Buffer<u8>,
    airlight: &[f64; 3],
    omega: f64,
    t0: f64,
) -> HazeResult<[Plane; 3]> {
    const OP: &str = "transmission_maps";
    ensure_nonempty(dark, OP)?;
    ensure_channels(dark, 1, OP)?;
    ensure_omega(omega, OP)?;
    ensure_unit_range(t0, "t0", OP)?;
    for &a in airlight {
        ensure_positive(a, "airlight channel", OP)?;
    }

    Ok([
        transmission_from_dark(dark, airlight[0], omega, t0),
        transmission_from_dark(dark, airlight[1], omega, t0),
        transmission_from_dark(dark, airlight[2], omega, t0),
    ])
}

/// Inverts the haze model:
/// `J_c(x) = saturate((I_c(x) - A_c) / t_c(x) + A_c)`.
///
/// All arithmetic runs in `f64`; intermediates may leave [0, 255] and are
/// clamped, never wrapped, by one saturating cast per component.
///
/// # Errors
///
/// [`Configuration`](HazeError::Configuration) if the image is empty or
/// not 3-channel or a map is not single-channel;
/// [`DimensionMismatch`](HazeError::DimensionMismatch) if any
/// transmission map differs from the image in size.
pub fn recover_radiance(
    image: &Buffer<u8>,
    t: &[Plane; 3],
    airlight: &[f64; 3],
) -> HazeResult<Buffer<u8>> {
    const OP: &str = "recover_radiance";
    ensure_nonempty(image, OP)?;
    ensure_channels(image, 3, OP)?;
    for map in t {
        ensure_channels(map, 1, OP)?;
        ensure_same_dims(image, map)?;
    }

    let (width, height) = image.dims();
    let mut out = Buffer::new(width, height, 3);
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let i = image.at(x, y, c) as f64;
                let j = (i - airlight[c]) / t[c].at(x, y, 0) + airlight[c];
                out.set(x, y, c, saturate_u8(j));
            }
        }
    }
    Ok(out)
}

/// Removes haze from a 3-channel 8-bit image.
///
/// # Errors
///
/// - [`Configuration`](HazeError::Configuration) for an empty or
///   non-3-channel image or out-of-range parameters
/// - [`Estimation`](HazeError::Estimation) if the airlight quota rounds
///   down to zero pixels, or the estimated airlight has a zero channel
///   (the transmission formula would divide by it)
pub fn dehaze(image: &Buffer<u8>, config: &DehazeConfig) -> HazeResult<DehazeOutput> {
    const OP: &str = "dehaze";
    ensure_nonempty(image, OP)?;
    ensure_channels(image, 3, OP)?;
    config.validate()?;

    let dark = dark_channel(image, config.dark_radius)?;
    let airlight = estimate_airlight(image, &dark, config.top_percent)?;
    debug!(?airlight, "estimated atmospheric light");
    if airlight.iter().any(|&a| a <= 0.0) {
        return Err(HazeError::estimation(format!(
            "{OP}: atmospheric light has a zero channel ({airlight:?})"
        )));
    }

    let t = transmission_maps(&dark, &airlight, config.omega, config.t0)?;
    let transmission = [t[0].quantized(), t[1].quantized(), t[2].quantized()];
    let recovered = recover_radiance(image, &t, &airlight)?;

    let (refined_transmission, recovered_refined) = if config.refine {
        let luma = image.to_luma()?;
        let refined = [
            guided_filter(
                &transmission[0],
                &luma,
                config.refine_radius,
                config.refine_radius,
                config.refine_eta,
            )?,
            guided_filter(
                &transmission[1],
                &luma,
                config.refine_radius,
                config.refine_radius,
                config.refine_eta,
            )?,
            guided_filter(
                &transmission[2],
                &luma,
                config.refine_radius,
                config.refine_radius,
                config.refine_eta,
            )?,
        ];
        // The guided filter can undershoot near strong edges; the refined
        // maps must still respect the t0 floor.
        let refined_t = [
            clamped_plane(&refined[0], config.t0),
            clamped_plane(&refined[1], config.t0),
            clamped_plane(&refined[2], config.t0),
        ];
        let recovered_refined = recover_radiance(image, &refined_t, &airlight)?;
        (Some(refined), Some(recovered_refined))
    } else {
        (None, None)
    };

    Ok(DehazeOutput {
        dark_channel: dark,
        airlight,
        transmission,
        recovered,
        refined_transmission,
        recovered_refined,
    })
}

fn transmission_from_dark(dark: &Buffer<u8>, a: f64, omega: f64, t0: f64) -> Plane {
    let mut out = Buffer::new(dark.width(), dark.height(), 1);
    for (o, &v) in out.as_mut_slice().iter_mut().zip(dark.as_slice()) {
        let t = 1.0 - omega * v as f64 / a;
        *o = t.max(t0);
    }
    out
}

/// [0, 1] working-domain copy of a quantized transmission map with the
/// t0 floor re-applied.
fn clamped_plane(map: &Buffer<u8>, t0: f64) -> Plane {
    let mut out = map.normalized();
    for v in out.as_mut_slice() {
        *v = v.max(t0);
    }
    out
}
