//! Volume preprocessing and sub-volume sampling
//!
//! This module contains volume-related functionality including:
//! - Normalisation of decoded scans into pore indicators
//! - Origin-anchored cubic sampling at fractional scales
//! - Seeded synthetic porous volumes

/// Pore-indicator volumes and whole-image porosity
pub mod image;
/// Cubic sub-volume extraction
pub mod sampler;
/// Synthetic overlapping-sphere volumes
pub mod synthetic;

pub use image::{VolumeImage, VolumeSummary};
pub use sampler::SubVolume;
