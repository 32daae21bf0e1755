//! Marker-based watershed on the pore distance map
//!
//! Pores are seeded at plateau maxima of the distance transform and flooded
//! outward in order of decreasing distance, so regions meet at the narrow
//! throats between pore bodies. Every pore voxel receives exactly one label.

use crate::io::error::{Result, computation_error};
use crate::segment::components::ConnectedComponents;
use crate::segment::distance::distance_transform;
use crate::segment::engine::{Connectivity, LabeledRegions, PoreSegmenter, neighbors};
use bitvec::prelude::*;
use log::debug;
use ndarray::{Array3, ArrayView3, Axis, Slice};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Distance-transform watershed partitioning pore space into pore bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watershed {
    connectivity: Connectivity,
    min_peak_distance: usize,
}

impl Watershed {
    /// Create an engine with the given flooding neighbourhood and marker separation
    ///
    /// A voxel seeds a marker only if no pore voxel within `min_peak_distance`
    /// (Chebyshev) lies further from the solid; a separation of 0 behaves like 1.
    pub const fn new(connectivity: Connectivity, min_peak_distance: usize) -> Self {
        Self {
            connectivity,
            min_peak_distance,
        }
    }

    /// Neighbourhood used while flooding
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Minimum Chebyshev separation between markers in voxels
    pub const fn min_peak_distance(&self) -> usize {
        self.min_peak_distance
    }

    // 1 where a pore voxel is the maximum of the distance map within its window
    fn peak_mask(&self, pores: ArrayView3<'_, u8>, distance: &Array3<f64>) -> Array3<u8> {
        let reach = self.min_peak_distance.max(1);
        let mut mask = Array3::<u8>::zeros(distance.dim());

        for ((x, y, z), &value) in distance.indexed_iter() {
            if pores.get((x, y, z)).copied() != Some(1) {
                continue;
            }
            let centre = [x, y, z];
            let window = distance.slice_each_axis(|axis| {
                let Axis(index) = axis.axis;
                let at = centre.get(index).copied().unwrap_or(0);
                Slice::from(at.saturating_sub(reach)..(at + reach + 1).min(axis.len))
            });
            let is_peak = window.iter().all(|&other| other <= value);
            if is_peak {
                if let Some(slot) = mask.get_mut((x, y, z)) {
                    *slot = 1;
                }
            }
        }
        mask
    }
}

#[derive(Debug, Clone, Copy)]
struct FloodEntry {
    distance: f64,
    order: u64,
    voxel: [usize; 3],
    label: u32,
}

impl PartialEq for FloodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodEntry {}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloodEntry {
    // Largest distance first; earlier insertions win ties
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PoreSegmenter for Watershed {
    fn name(&self) -> &'static str {
        "watershed"
    }

    fn segment(&self, pores: ArrayView3<'_, u8>) -> Result<LabeledRegions> {
        let dims = pores.dim();
        if !pores.iter().any(|&v| v == 1) {
            return Ok(LabeledRegions::empty(dims));
        }

        let distance = distance_transform(pores.view());
        let peaks = self.peak_mask(pores.view(), &distance);

        // Peak voxels adjacent under the flooding neighbourhood seed a single marker
        let markers = ConnectedComponents::new(self.connectivity).segment(peaks.view())?;
        let marker_count = markers.region_count();
        let mut labels = markers.labels().clone();

        let offsets = self.connectivity.offsets();
        let mut queued = bitvec![0; labels.len()];
        let flat_index = |[x, y, z]: [usize; 3]| (x * dims.1 + y) * dims.2 + z;

        let mut heap = BinaryHeap::new();
        let mut order = 0u64;
        for ((x, y, z), &label) in labels.indexed_iter() {
            if label == 0 {
                continue;
            }
            queued.set(flat_index([x, y, z]), true);
            heap.push(FloodEntry {
                distance: distance.get((x, y, z)).copied().unwrap_or(0.0),
                order,
                voxel: [x, y, z],
                label,
            });
            order += 1;
        }

        while let Some(entry) = heap.pop() {
            for neighbor in neighbors(entry.voxel, dims, &offsets) {
                if pores.get(neighbor).copied() != Some(1) {
                    continue;
                }
                let index = flat_index(neighbor);
                if queued.get(index).as_deref() != Some(&false) {
                    continue;
                }
                queued.set(index, true);
                if let Some(slot) = labels.get_mut(neighbor) {
                    *slot = entry.label;
                }
                heap.push(FloodEntry {
                    distance: distance.get(neighbor).copied().unwrap_or(0.0),
                    order,
                    voxel: neighbor,
                    label: entry.label,
                });
                order += 1;
            }
        }

        let orphans = label_orphans(pores, &mut labels, &offsets, marker_count)?;
        debug!("watershed seeded {marker_count} markers, {orphans} unmarked clusters");

        Ok(LabeledRegions::from_labels(labels))
    }
}

// Pore clusters that no marker reached become regions of their own
fn label_orphans(
    pores: ArrayView3<'_, u8>,
    labels: &mut Array3<u32>,
    offsets: &[[isize; 3]],
    first_free: usize,
) -> Result<usize> {
    let dims = pores.dim();
    let mut next = first_free;
    let mut queue = VecDeque::new();

    for ((x, y, z), &value) in pores.indexed_iter() {
        if value != 1 || labels.get((x, y, z)).copied().unwrap_or(0) != 0 {
            continue;
        }
        next += 1;
        let label = u32::try_from(next).map_err(|e| computation_error("watershed", &e))?;
        if let Some(slot) = labels.get_mut((x, y, z)) {
            *slot = label;
        }
        queue.push_back([x, y, z]);
        while let Some(voxel) = queue.pop_front() {
            for neighbor in neighbors(voxel, dims, offsets) {
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
    }

    Ok(next - first_free)
}
