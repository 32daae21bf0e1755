//! Pore size distributions as equivalent-sphere radii

use crate::math::units::equivalent_radius;
use crate::segment::PoreRegion;

/// Convert each region to its equivalent-sphere radius, preserving region order
pub fn pore_size_distribution(regions: &[PoreRegion], resolution: f64) -> Vec<f64> {
    regions
        .iter()
        .map(|region| equivalent_radius(region.voxel_volume(), resolution))
        .collect()
}

/// Descriptive statistics of a PSD for progress reporting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsdSummary {
    /// Number of pores
    pub count: usize,
    /// Smallest radius
    pub min: f64,
    /// Largest radius
    pub max: f64,
    /// Arithmetic mean radius
    pub mean: f64,
    /// Median radius (mean of the two central values for even counts)
    pub median: f64,
}

impl PsdSummary {
    /// Summarise a set of radii, `None` when there are no pores
    pub fn from_radii(radii: &[f64]) -> Option<Self> {
        if radii.is_empty() {
            return None;
        }

        let mut sorted = radii.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let min = sorted.first().copied()?;
        let max = sorted.last().copied()?;
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let upper = sorted.get(count / 2).copied()?;
        let median = if count % 2 == 0 {
            let lower = sorted.get(count / 2 - 1).copied()?;
            (lower + upper) / 2.0
        } else {
            upper
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
        })
    }
}
