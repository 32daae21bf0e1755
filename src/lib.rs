//! Pore size distribution and representative elementary volume analysis of micro-CT scans
//!
//! The system binarizes a scanned rock volume, crops origin-anchored cubes at a series
//! of scales, partitions each cube's pore space and reports porosity against sample
//! volume together with equivalent-sphere pore radii.

#![forbid(unsafe_code)]

/// REV accounting, pore size distributions and the multi-scale pipeline
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Unit conversions between voxels and physical quantities
pub mod math;
/// Pore-space partitioning engines
pub mod segment;
/// Volume preprocessing and sub-volume sampling
pub mod volume;

pub use io::error::{AnalysisError, Result};
