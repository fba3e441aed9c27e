//! Integration tests for haze-rs crates.
//!
//! This crate contains end-to-end tests that verify the interaction
//! between `haze-core` buffers and the `haze-ops` pipeline, plus
//! cross-validation of the accelerated algorithms against their
//! brute-force references on generated images.
