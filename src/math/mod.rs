//! Mathematical utilities for the analysis

/// Conversions between voxel counts and physical quantities
pub mod units;
