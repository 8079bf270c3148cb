//! The five dataset preparation stages.
//!
//! `convert` turns container audio into normalized WAVs and filters by
//! duration; the other four parameterize the manifest pipeline with one
//! transform each.

/// Container-to-WAV conversion with the duration filter.
pub mod convert;
/// Random low-pass filter augmentation.
pub mod lowpass;
/// Additive Gaussian noise augmentation.
pub mod noise;
/// Fixed 2x speed augmentation.
pub mod speed;
/// Random volume gain augmentation.
pub mod volume;
