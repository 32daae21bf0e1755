//! Seeded synthetic porous volumes built from overlapping spherical pores
//!
//! Output is encoded like decoded scanner data (pore = 0, background = `u16::MAX`)
//! so it passes through the same preprocessing as a real scan.

use crate::io::configuration::{
    DEFAULT_SEED, DEFAULT_SYNTHETIC_POROSITY, DEFAULT_SYNTHETIC_SPHERE_RADIUS, MAX_SYNTHETIC_EDGE,
};
use crate::io::error::{Result, invalid_parameter};
use ndarray::Array3;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Parameters of a synthetic volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    /// Edge length of the cubic volume in voxels
    pub edge: usize,
    /// Target pore fraction in [0, 1]
    pub porosity: f64,
    /// Radius of each carved sphere in voxels
    pub sphere_radius: f64,
    /// Random seed
    pub seed: u64,
}

impl SyntheticConfig {
    /// Configuration with default porosity, sphere radius and seed
    pub const fn new(edge: usize) -> Self {
        Self {
            edge,
            porosity: DEFAULT_SYNTHETIC_POROSITY,
            sphere_radius: DEFAULT_SYNTHETIC_SPHERE_RADIUS,
            seed: DEFAULT_SEED,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.edge == 0 || self.edge > MAX_SYNTHETIC_EDGE {
            return Err(invalid_parameter(
                "edge",
                &self.edge,
                &format!("must be between 1 and {MAX_SYNTHETIC_EDGE}"),
            ));
        }
        if !(0.0..=1.0).contains(&self.porosity) {
            return Err(invalid_parameter(
                "porosity",
                &self.porosity,
                &"must lie in [0, 1]",
            ));
        }
        if !self.sphere_radius.is_finite() || self.sphere_radius <= 0.0 {
            return Err(invalid_parameter(
                "sphere_radius",
                &self.sphere_radius,
                &"must be a positive finite number of voxels",
            ));
        }
        Ok(())
    }
}

/// Generate a cubic volume by carving random spheres until the target porosity is reached
///
/// Identical configurations always produce identical volumes.
///
/// # Errors
///
/// Returns an error if the edge, porosity or sphere radius is out of range
pub fn generate(config: &SyntheticConfig) -> Result<Array3<u16>> {
    config.validate()?;

    let edge = config.edge;
    let total = edge.pow(3);
    let target = (config.porosity * total as f64).round() as usize;
    let mut volume = Array3::from_elem((edge, edge, edge), u16::MAX);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let reach = config.sphere_radius.ceil() as isize;
    let radius_sq = config.sphere_radius * config.sphere_radius;
    let mut pores = 0usize;

    // Late insertions often land on existing pore space and carve nothing
    for _ in 0..total.saturating_mul(4) {
        if pores >= target {
            break;
        }
        let centre = [
            rng.random_range(0..edge) as isize,
            rng.random_range(0..edge) as isize,
            rng.random_range(0..edge) as isize,
        ];
        pores += carve_sphere(&mut volume, centre, reach, radius_sq);
    }

    Ok(volume)
}

// Returns the number of voxels newly turned into pore
fn carve_sphere(
    volume: &mut Array3<u16>,
    centre: [isize; 3],
    reach: isize,
    radius_sq: f64,
) -> usize {
    let mut carved = 0;
    for dx in -reach..=reach {
        for dy in -reach..=reach {
            for dz in -reach..=reach {
                let distance_sq = (dx * dx + dy * dy + dz * dz) as f64;
                if distance_sq > radius_sq {
                    continue;
                }
                let (Ok(x), Ok(y), Ok(z)) = (
                    usize::try_from(centre[0] + dx),
                    usize::try_from(centre[1] + dy),
                    usize::try_from(centre[2] + dz),
                ) else {
                    continue;
                };
                if let Some(value) = volume.get_mut((x, y, z)) {
                    if *value != 0 {
                        *value = 0;
                        carved += 1;
                    }
                }
            }
        }
    }
    carved
}
