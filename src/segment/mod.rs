//! Pore-space partitioning
//!
//! This module contains segmentation functionality including:
//! - The engine capability and the adapter flattening its output
//! - Connected-component labelling
//! - Euclidean distance transform and marker-based watershed

/// Connected-component labelling engine
pub mod components;
/// Exact Euclidean distance transform
pub mod distance;
/// Engine capability, region types and the partition adapter
pub mod engine;
/// Distance-transform watershed engine
pub mod watershed;

pub use engine::{LabeledRegions, PoreRegion, PoreSegmenter, partition};
