//! # haze-core
//!
//! Core types for single-image haze removal and guided filtering.
//!
//! This crate provides the foundational pieces shared by the `haze-rs`
//! workspace:
//!
//! - [`Buffer`] - owned, contiguous, row-major pixel buffer with explicit
//!   stride and indexed accessors
//! - [`Plane`] - single-channel `f64` buffer for windowed statistics
//! - [`Sample`] - the `u8`/`f64` component trait and the saturating 8-bit
//!   cast
//! - [`Error`] - buffer construction/access errors
//!
//! ## Design Philosophy
//!
//! Buffers are plain owned values: no reference counting, no views, no
//! shared mutation. Every algorithm takes buffers by reference and returns
//! freshly allocated results, so a single invocation owns everything it
//! touches and parallel invocations never alias.
//!
//! All arithmetic runs in `f64` and re-enters the 8-bit image domain
//! through one saturating cast at the final write.
//!
//! ## Crate Structure
//!
//! This crate is the foundation of the workspace and has no internal
//! dependencies:
//!
//! ```text
//! haze-core (this crate)
//!    ^
//!    |
//!    +-- haze-ops (box filter, guided filter, dark channel, dehaze)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod sample;

// Re-exports for convenience
pub use buffer::{Buffer, Plane};
pub use error::{Error, Result};
pub use sample::{
    luminance_bt601, saturate_u8, Sample, BT601_LUMA_B, BT601_LUMA_G, BT601_LUMA_R,
};
