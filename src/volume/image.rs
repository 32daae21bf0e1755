//! Binary pore-indicator volumes and whole-image porosity accounting

use crate::analysis::rev::RevPoint;
use crate::io::error::{Result, shape_error};
use crate::math::units::{fraction, validate_resolution, voxels_to_mm3};
use ndarray::{Array, Array3, ArrayView3, Dimension, Ix3};
use num_traits::{PrimInt, Unsigned};

/// Whole-volume quantities reported once per run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSummary {
    /// Array dimensions along axes 0, 1 and 2
    pub dims: (usize, usize, usize),
    /// Number of voxels in the volume
    pub total_voxels: u64,
    /// Number of pore voxels in the volume
    pub pore_voxels: u64,
    /// Pore voxels divided by total voxels
    pub porosity: f64,
    /// Physical volume in mm³
    pub volume_mm3: f64,
}

impl VolumeSummary {
    /// The whole-image point that seeds a REV trace
    pub const fn rev_point(&self) -> RevPoint {
        RevPoint {
            volume_mm3: self.volume_mm3,
            porosity: self.porosity,
        }
    }
}

/// Three-dimensional pore indicator (1 = pore, 0 = background) with its voxel size
///
/// Every element is 0 or 1 and every dimension is at least one voxel long.
#[derive(Debug, Clone)]
pub struct VolumeImage {
    data: Array3<u8>,
    resolution: f64,
    pore_voxels: u64,
}

impl VolumeImage {
    /// Normalise a decoded scanner volume into a pore indicator
    ///
    /// Scanner output stores background at the maximum value of the pixel type and
    /// pore space at zero. Values at or above half the maximum become background,
    /// everything below becomes pore.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The array does not have exactly three dimensions
    /// - Any dimension has zero length
    /// - The resolution is not a positive finite number
    pub fn preprocess<T, D>(raw: &Array<T, D>, resolution: f64) -> Result<Self>
    where
        T: PrimInt + Unsigned,
        D: Dimension,
    {
        let dims = raw.shape();
        if dims.len() != 3 {
            return Err(shape_error(
                dims,
                &format!("expected 3 dimensions, found {}", dims.len()),
            ));
        }
        if dims.contains(&0) {
            return Err(shape_error(dims, &"every dimension must be at least 1"));
        }
        let resolution = validate_resolution(resolution)?;

        let view = raw
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|e| shape_error(dims, &e))?;

        let two = T::one() + T::one();
        let threshold = T::max_value() / two + T::one();
        let data = view.mapv(|value| u8::from(value < threshold));

        Ok(Self::from_parts(data, resolution))
    }

    /// Wrap an array that is already a 0/1 pore indicator
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any dimension has zero length
    /// - Any element is neither 0 nor 1
    /// - The resolution is not a positive finite number
    pub fn from_binary(data: Array3<u8>, resolution: f64) -> Result<Self> {
        if data.shape().contains(&0) {
            return Err(shape_error(
                data.shape(),
                &"every dimension must be at least 1",
            ));
        }
        if let Some(value) = data.iter().find(|&&v| v > 1) {
            return Err(shape_error(
                data.shape(),
                &format!("voxel value {value} is not binary"),
            ));
        }
        let resolution = validate_resolution(resolution)?;
        Ok(Self::from_parts(data, resolution))
    }

    fn from_parts(data: Array3<u8>, resolution: f64) -> Self {
        let pore_voxels = count_pores(data.view());
        Self {
            data,
            resolution,
            pore_voxels,
        }
    }

    /// Read-only view of the pore indicator
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// Physical edge length of one voxel in micrometres
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Dimensions along axes 0, 1 and 2
    pub fn dims(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Length of the shortest axis
    pub fn shortest_axis(&self) -> usize {
        let (nx, ny, nz) = self.dims();
        nx.min(ny).min(nz)
    }

    /// Number of voxels in the volume
    pub fn total_voxels(&self) -> u64 {
        self.data.len() as u64
    }

    /// Number of pore voxels in the volume
    pub const fn pore_voxels(&self) -> u64 {
        self.pore_voxels
    }

    /// Pore voxels divided by total voxels
    pub fn porosity(&self) -> f64 {
        fraction(self.pore_voxels, self.total_voxels())
    }

    /// Physical volume in mm³
    pub fn volume_mm3(&self) -> f64 {
        voxels_to_mm3(self.total_voxels(), self.resolution)
    }

    /// Whole-volume quantities
    pub fn summary(&self) -> VolumeSummary {
        VolumeSummary {
            dims: self.dims(),
            total_voxels: self.total_voxels(),
            pore_voxels: self.pore_voxels,
            porosity: self.porosity(),
            volume_mm3: self.volume_mm3(),
        }
    }
}

/// Count the pore voxels of a 0/1 indicator view
pub fn count_pores(data: ArrayView3<'_, u8>) -> u64 {
    data.iter().map(|&v| u64::from(v)).sum()
}
