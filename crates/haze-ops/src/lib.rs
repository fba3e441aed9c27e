//! # haze-ops
//!
//! Guided filtering and dark-channel-prior haze removal over
//! [`haze_core`] pixel buffers.
//!
//! # Modules
//!
//! - [`pad`] - replicate border extension
//! - [`boxfilter`] - O(H * W) windowed means, radius-independent
//! - [`guided`] - edge-preserving locally-linear filtering
//! - [`dark`] - dark channel extraction with a separable minimum filter
//! - [`airlight`] - top-percentile atmospheric light estimation
//! - [`dehaze`] - transmission maps and radiance recovery
//!
//! # Example
//!
//! ```rust
//! use haze_core::Buffer;
//! use haze_ops::dehaze::{dehaze, DehazeConfig};
//! use haze_ops::guided::guided_filter;
//!
//! // Edge-preserving denoising: guide a buffer by itself.
//! let noisy = Buffer::filled(64, 64, 1, 90u8);
//! let smooth = guided_filter(&noisy, &noisy, 2, 2, 0.01).unwrap();
//! assert_eq!(smooth.dims(), (64, 64));
//!
//! // Full haze-removal pipeline with diagnostics.
//! let hazy = Buffer::filled(64, 64, 3, 140u8);
//! let config = DehazeConfig { top_percent: 0.01, ..DehazeConfig::default() };
//! let result = dehaze(&hazy, &config).unwrap();
//! assert_eq!(result.transmission.len(), 3);
//! ```
//!
//! Everything is synchronous, allocation-pure, and free of shared state:
//! each call takes borrowed inputs and returns freshly owned outputs, so
//! independent images can be processed from independent threads without
//! coordination.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod airlight;
pub mod boxfilter;
pub mod dark;
pub mod dehaze;
pub mod guard;
pub mod guided;
pub mod pad;

pub use dehaze::{DehazeConfig, DehazeOutput};
pub use error::{HazeError, HazeResult};
