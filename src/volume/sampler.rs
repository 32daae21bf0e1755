//! Origin-anchored cubic sub-volumes at fractional scales

use crate::io::error::{AnalysisError, Result};
use crate::math::units::{cube_volume_mm3, fraction};
use crate::volume::image::{VolumeImage, count_pores};
use ndarray::{ArrayView3, Slice};

/// Cubic crop `[0:edge, 0:edge, 0:edge]` of a volume, borrowed from it
#[derive(Debug, Clone)]
pub struct SubVolume<'a> {
    view: ArrayView3<'a, u8>,
    fraction: f64,
    edge: usize,
    resolution: f64,
    pore_voxels: u64,
}

impl SubVolume<'_> {
    /// Read-only view of the cropped pore indicator
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.view.view()
    }

    /// Requested scale as percent of the shortest axis
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Edge length of the cube in voxels
    pub const fn edge(&self) -> usize {
        self.edge
    }

    /// Physical edge length of one voxel in micrometres
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Number of voxels in the crop (`edge³`)
    pub const fn total_voxels(&self) -> u64 {
        (self.edge as u64).pow(3)
    }

    /// Number of pore voxels in the crop
    pub const fn pore_voxels(&self) -> u64 {
        self.pore_voxels
    }

    /// Pore voxels divided by crop voxels
    pub fn porosity(&self) -> f64 {
        fraction(self.pore_voxels, self.total_voxels())
    }

    /// Physical volume of the crop in mm³
    pub fn volume_mm3(&self) -> f64 {
        cube_volume_mm3(self.edge, self.resolution)
    }
}

/// Edge length in voxels of the cube covering `fraction` percent of `shortest_axis`
///
/// # Errors
///
/// Returns an error if:
/// - The fraction lies outside (0, 100] or is not a number
/// - The resulting edge is shorter than one voxel
pub fn edge_length(shortest_axis: usize, fraction: f64) -> Result<usize> {
    if fraction.is_nan() || fraction <= 0.0 || fraction > 100.0 {
        return Err(AnalysisError::Range { scale: fraction });
    }

    let edge = (fraction / 100.0 * shortest_axis as f64).floor() as usize;
    if edge < 1 {
        return Err(AnalysisError::DegenerateVolume {
            scale: fraction,
            shortest_axis,
        });
    }
    Ok(edge)
}

/// Crop the cube covering `fraction` percent of the shortest axis, anchored at the origin
///
/// # Errors
///
/// Returns an error if:
/// - The fraction lies outside (0, 100] or is not a number
/// - The resulting edge is shorter than one voxel
pub fn sample(volume: &VolumeImage, fraction: f64) -> Result<SubVolume<'_>> {
    let edge = edge_length(volume.shortest_axis(), fraction)?;
    let mut view = volume.data();
    view.slice_each_axis_inplace(|_| Slice::from(0..edge));
    let pore_voxels = count_pores(view.view());

    Ok(SubVolume {
        view,
        fraction,
        edge,
        resolution: volume.resolution(),
        pore_voxels,
    })
}
