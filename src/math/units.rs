//! Conversions between voxel counts, physical radii and volumes
//!
//! Resolutions are the physical edge length of one voxel in micrometres;
//! volumes are reported in cubic millimetres.

use crate::io::configuration::MICRONS_PER_MILLIMETER;
use crate::io::error::{Result, invalid_parameter};
use std::f64::consts::PI;

/// Radius of the sphere whose volume equals `voxel_volume` voxels, in physical units
///
/// Inverts `V = 4/3 π r³` in voxel units, then scales by the voxel edge length.
/// A zero volume maps to a zero radius.
pub fn equivalent_radius(voxel_volume: u64, resolution: f64) -> f64 {
    let radius_voxels = (0.75 * (1.0 / PI) * voxel_volume as f64).cbrt();
    radius_voxels * resolution
}

/// Physical volume in mm³ of `voxel_count` voxels
pub fn voxels_to_mm3(voxel_count: u64, resolution: f64) -> f64 {
    voxel_count as f64 * (resolution / MICRONS_PER_MILLIMETER).powi(3)
}

/// Physical volume in mm³ of a cube with `edge` voxels per side
pub fn cube_volume_mm3(edge: usize, resolution: f64) -> f64 {
    (edge as f64 * resolution / MICRONS_PER_MILLIMETER).powi(3)
}

/// Fraction of `total` occupied by `part`, zero for an empty total
pub fn fraction(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Check that a voxel resolution is usable
///
/// # Errors
///
/// Returns an error if the resolution is not a positive finite number
pub fn validate_resolution(resolution: f64) -> Result<f64> {
    if resolution.is_finite() && resolution > 0.0 {
        Ok(resolution)
    } else {
        Err(invalid_parameter(
            "resolution",
            &resolution,
            &"must be a positive finite length per voxel edge",
        ))
    }
}
