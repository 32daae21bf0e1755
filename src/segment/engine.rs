//! Segmentation capability and the adapter that flattens its output into pore volumes

use crate::io::error::{Result, computation_error, invalid_parameter};
use crate::segment::components::ConnectedComponents;
use crate::segment::watershed::Watershed;
use crate::volume::SubVolume;
use clap::ValueEnum;
use log::debug;
use ndarray::{Array3, ArrayView3};

/// Voxel neighbourhood used when growing regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// 6 neighbours sharing a face
    Face,
    /// 18 neighbours sharing a face or an edge
    Edge,
    /// 26 neighbours sharing a face, an edge or a corner
    Vertex,
}

impl Connectivity {
    /// Parse a neighbour count (6, 18 or 26)
    ///
    /// # Errors
    ///
    /// Returns an error for any other neighbour count
    pub fn from_neighbor_count(count: usize) -> Result<Self> {
        match count {
            6 => Ok(Self::Face),
            18 => Ok(Self::Edge),
            26 => Ok(Self::Vertex),
            _ => Err(invalid_parameter(
                "connectivity",
                &count,
                &"must be 6, 18 or 26",
            )),
        }
    }

    /// Number of neighbours of an interior voxel
    pub const fn neighbor_count(self) -> usize {
        match self {
            Self::Face => 6,
            Self::Edge => 18,
            Self::Vertex => 26,
        }
    }

    /// Offsets of every neighbour relative to the centre voxel
    pub fn offsets(self) -> Vec<[isize; 3]> {
        // Manhattan length 1 = face, 2 = edge, 3 = corner
        let max_manhattan = match self {
            Self::Face => 1,
            Self::Edge => 2,
            Self::Vertex => 3,
        };
        let mut offsets = Vec::with_capacity(self.neighbor_count());
        for dx in -1isize..=1 {
            for dy in -1isize..=1 {
                for dz in -1isize..=1 {
                    let manhattan = dx.abs() + dy.abs() + dz.abs();
                    if manhattan > 0 && manhattan <= max_manhattan {
                        offsets.push([dx, dy, dz]);
                    }
                }
            }
        }
        offsets
    }
}

/// In-bounds neighbours of `voxel` for the given offsets
pub fn neighbors<'a>(
    voxel: [usize; 3],
    dims: (usize, usize, usize),
    offsets: &'a [[isize; 3]],
) -> impl Iterator<Item = [usize; 3]> + 'a {
    let bounds = [dims.0, dims.1, dims.2];
    offsets.iter().filter_map(move |offset| {
        let mut neighbor = [0usize; 3];
        for (((slot, &coordinate), &delta), &bound) in neighbor
            .iter_mut()
            .zip(voxel.iter())
            .zip(offset.iter())
            .zip(bounds.iter())
        {
            let shifted = coordinate.checked_add_signed(delta)?;
            if shifted >= bound {
                return None;
            }
            *slot = shifted;
        }
        Some(neighbor)
    })
}

/// Disjoint labeled pore regions with per-region voxel counts
///
/// Label 0 marks background; label `i + 1` owns `voxel_counts[i]` voxels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledRegions {
    labels: Array3<u32>,
    voxel_counts: Vec<u64>,
}

impl LabeledRegions {
    /// Pair a label array with counts already gathered while labelling
    pub const fn from_parts(labels: Array3<u32>, voxel_counts: Vec<u64>) -> Self {
        Self {
            labels,
            voxel_counts,
        }
    }

    /// Count the voxels carrying each label of a label array
    ///
    /// Labels must be contiguous starting from 1; the largest label sets the region count.
    pub fn from_labels(labels: Array3<u32>) -> Self {
        let region_count = labels.iter().copied().max().unwrap_or(0) as usize;
        let mut voxel_counts = vec![0u64; region_count];
        for &label in &labels {
            if label > 0 {
                if let Some(count) = voxel_counts.get_mut(label as usize - 1) {
                    *count += 1;
                }
            }
        }
        Self {
            labels,
            voxel_counts,
        }
    }

    /// A result with no regions for a volume of the given dimensions
    pub fn empty(dims: (usize, usize, usize)) -> Self {
        Self {
            labels: Array3::zeros(dims),
            voxel_counts: Vec::new(),
        }
    }

    /// Per-voxel labels (0 = background)
    pub const fn labels(&self) -> &Array3<u32> {
        &self.labels
    }

    /// Voxel count of each region, indexed by label - 1
    pub fn voxel_counts(&self) -> &[u64] {
        &self.voxel_counts
    }

    /// Number of regions
    pub fn region_count(&self) -> usize {
        self.voxel_counts.len()
    }

    /// Discard the label array and keep only the voxel counts
    pub fn into_voxel_counts(self) -> Vec<u64> {
        self.voxel_counts
    }
}

/// Engine that partitions the pore space of a binary volume into disjoint regions
pub trait PoreSegmenter {
    /// Short engine name for logging
    fn name(&self) -> &'static str;

    /// Label the pore voxels (value 1) of `pores`
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot label the volume
    fn segment(&self, pores: ArrayView3<'_, u8>) -> Result<LabeledRegions>;
}

/// Available segmentation engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SegmenterKind {
    /// Distance-transform watershed splitting pores at their throats
    Watershed,
    /// Connected-component labelling of the pore space
    Components,
}

/// Construct the selected engine
///
/// # Errors
///
/// Returns an error if the connectivity is not 6, 18 or 26
pub fn build_segmenter(
    kind: SegmenterKind,
    connectivity: usize,
    min_peak_distance: usize,
) -> Result<Box<dyn PoreSegmenter>> {
    let connectivity = Connectivity::from_neighbor_count(connectivity)?;
    Ok(match kind {
        SegmenterKind::Watershed => Box::new(Watershed::new(connectivity, min_peak_distance)),
        SegmenterKind::Components => Box::new(ConnectedComponents::new(connectivity)),
    })
}

/// A single pore reduced to its voxel volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoreRegion {
    voxel_volume: u64,
}

impl PoreRegion {
    /// Create a region of `voxel_volume` voxels
    pub const fn new(voxel_volume: u64) -> Self {
        Self { voxel_volume }
    }

    /// Number of voxels in the region
    pub const fn voxel_volume(&self) -> u64 {
        self.voxel_volume
    }
}

/// Segment a sub-volume and flatten the labeled output into per-pore voxel volumes
///
/// Regions keep the engine's label order; empty labels are dropped. A crop with no
/// pore space yields no regions.
///
/// # Errors
///
/// Returns an error if:
/// - The engine fails
/// - The engine's label array does not match the crop
/// - The region volumes do not add up to the crop's pore voxel count
pub fn partition(
    segmenter: &dyn PoreSegmenter,
    sub_volume: &SubVolume<'_>,
) -> Result<Vec<PoreRegion>> {
    let view = sub_volume.view();
    let segmentation = segmenter.segment(view.view())?;

    if segmentation.labels().dim() != view.dim() {
        return Err(computation_error(
            "pore partitioning",
            &format!(
                "{} returned labels of shape {:?} for a crop of shape {:?}",
                segmenter.name(),
                segmentation.labels().dim(),
                view.dim()
            ),
        ));
    }

    let regions: Vec<PoreRegion> = segmentation
        .into_voxel_counts()
        .into_iter()
        .filter(|&count| count > 0)
        .map(PoreRegion::new)
        .collect();

    let assigned: u64 = regions.iter().map(PoreRegion::voxel_volume).sum();
    if assigned != sub_volume.pore_voxels() {
        return Err(computation_error(
            "pore partitioning",
            &format!(
                "{} assigned {assigned} voxels but the crop holds {} pore voxels",
                segmenter.name(),
                sub_volume.pore_voxels()
            ),
        ));
    }

    debug!(
        "{} found {} pores in {}^3 crop",
        segmenter.name(),
        regions.len(),
        sub_volume.edge()
    );
    Ok(regions)
}
