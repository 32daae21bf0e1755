//! Representative elementary volume trace across scales

use crate::io::error::{Result, computation_error};
use crate::math::units::cube_volume_mm3;
use crate::segment::PoreRegion;
use serde::Serialize;

/// One point of the REV curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevPoint {
    /// Physical volume of the analysed region in mm³
    pub volume_mm3: f64,
    /// Pore fraction of the analysed region
    pub porosity: f64,
}

/// Ordered REV points, whole image first, then one per processed scale
#[derive(Debug, Clone, PartialEq)]
pub struct RevTrace {
    points: Vec<RevPoint>,
}

impl RevTrace {
    /// Start a trace from the whole-image point
    pub fn new(whole_image: RevPoint) -> Self {
        Self {
            points: vec![whole_image],
        }
    }

    /// Append the point of a cubic crop with `edge` voxels per side
    ///
    /// Porosity is the summed region volume over the crop's voxel count.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is zero or the regions hold more voxels than the crop
    pub fn record(
        &mut self,
        edge: usize,
        regions: &[PoreRegion],
        resolution: f64,
    ) -> Result<RevPoint> {
        let total = (edge as u64).pow(3);
        if total == 0 {
            return Err(computation_error(
                "REV accumulation",
                &"sub-volume edge must be at least one voxel",
            ));
        }

        let pore_voxels: u64 = regions.iter().map(PoreRegion::voxel_volume).sum();
        if pore_voxels > total {
            return Err(computation_error(
                "REV accumulation",
                &format!("{pore_voxels} pore voxels exceed the {total} voxels of a {edge}^3 crop"),
            ));
        }

        let point = RevPoint {
            volume_mm3: cube_volume_mm3(edge, resolution),
            porosity: pore_voxels as f64 / total as f64,
        };
        self.points.push(point);
        Ok(point)
    }

    /// All points in processing order
    pub fn points(&self) -> &[RevPoint] {
        &self.points
    }

    /// The whole-image point
    pub fn whole_image(&self) -> Option<&RevPoint> {
        self.points.first()
    }

    /// Number of points including the whole-image point
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the trace holds no points (never true for a constructed trace)
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
