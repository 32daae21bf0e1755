//! Connected-component labelling of pore space

use crate::io::error::{Result, computation_error};
use crate::segment::engine::{Connectivity, LabeledRegions, PoreSegmenter, neighbors};
use ndarray::{Array3, ArrayView3};
use std::collections::VecDeque;

/// Labels each connected cluster of pore voxels as one region
///
/// Labels are assigned in raster order of each cluster's first voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedComponents {
    connectivity: Connectivity,
}

impl ConnectedComponents {
    /// Create a labeller with the given neighbourhood
    pub const fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    /// Neighbourhood used to join voxels
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }
}

impl PoreSegmenter for ConnectedComponents {
    fn name(&self) -> &'static str {
        "connected-components"
    }

    fn segment(&self, pores: ArrayView3<'_, u8>) -> Result<LabeledRegions> {
        let dims = pores.dim();
        let offsets = self.connectivity.offsets();
        let mut labels = Array3::<u32>::zeros(dims);
        let mut voxel_counts = Vec::new();
        let mut queue = VecDeque::new();

        for ((x, y, z), &value) in pores.indexed_iter() {
            if value == 0 || labels.get((x, y, z)).copied().unwrap_or(0) != 0 {
                continue;
            }

            let label = u32::try_from(voxel_counts.len() + 1)
                .map_err(|e| computation_error("connected-component labelling", &e))?;
            if let Some(slot) = labels.get_mut((x, y, z)) {
                *slot = label;
            }
            queue.push_back([x, y, z]);

            let mut size = 0u64;
            while let Some(voxel) = queue.pop_front() {
                size += 1;
                for neighbor in neighbors(voxel, dims, &offsets) {
                    if pores.get(neighbor).copied() != Some(1) {
                        continue;
                    }
                    if let Some(slot) = labels.get_mut(neighbor) {
                        if *slot == 0 {
                            *slot = label;
                            queue.push_back(neighbor);
                        }
                    }
                }
            }
            voxel_counts.push(size);
        }

        Ok(LabeledRegions::from_parts(labels, voxel_counts))
    }
}
