//! Analysis constants and runtime configuration defaults

use crate::io::error::{Result, invalid_parameter};
use crate::segment::engine::SegmenterKind;
use std::path::{Path, PathBuf};

/// Micrometres per millimetre, converts voxel edges in µm to volumes in mm³
pub const MICRONS_PER_MILLIMETER: f64 = 1000.0;

/// Default physical edge length of one voxel in micrometres
pub const DEFAULT_RESOLUTION_UM: f64 = 1.0;

/// Default sub-volume scales as percent of the shortest axis
pub const DEFAULT_SCALES: [f64; 4] = [25.0, 50.0, 75.0, 100.0];

/// Default neighbourhood size for pore connectivity (vertex-connected)
pub const DEFAULT_CONNECTIVITY: usize = 26;

/// Default minimum separation between watershed markers in voxels
pub const DEFAULT_MIN_PEAK_DISTANCE: usize = 2;

/// Fixed seed for reproducible synthetic volumes
pub const DEFAULT_SEED: u64 = 42;

/// Default pore fraction of synthetic volumes
pub const DEFAULT_SYNTHETIC_POROSITY: f64 = 0.3;

/// Default radius in voxels of the spheres carved into synthetic volumes
pub const DEFAULT_SYNTHETIC_SPHERE_RADIUS: f64 = 4.0;

// Bounds generator memory
/// Maximum edge length of a synthetic volume
pub const MAX_SYNTHETIC_EDGE: usize = 1024;

// Output settings
/// Suffix inserted before the scale in PSD table filenames
pub const PSD_SUFFIX: &str = "_psd";
/// Suffix added to the REV table filename
pub const REV_SUFFIX: &str = "_rev";
/// Extension of every exported table
pub const TABLE_EXTENSION: &str = "csv";
/// Output stem used for synthetic volumes
pub const SYNTHETIC_STEM: &str = "synthetic";

/// Width of the scale progress bar in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Iteration scope of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Process every requested scale in order
    #[default]
    AllScales,
    /// Process only the first requested scale and return its PSD
    FirstScale,
}

/// Controls which results are persisted and which stay in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Write one PSD table per processed scale
    pub save_psd: bool,
    /// Write the REV table once the run completes
    pub save_rev: bool,
    /// Keep per-scale radii in the returned report
    pub retain_psd: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            save_psd: true,
            save_rev: true,
            retain_psd: true,
        }
    }
}

/// Pore segmentation engine selection and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmenterSettings {
    /// Engine used to partition pore space
    pub kind: SegmenterKind,
    /// Neighbourhood size (6, 18 or 26)
    pub connectivity: usize,
    /// Minimum separation between watershed markers in voxels
    pub min_peak_distance: usize,
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            kind: SegmenterKind::Watershed,
            connectivity: DEFAULT_CONNECTIVITY,
            min_peak_distance: DEFAULT_MIN_PEAK_DISTANCE,
        }
    }
}

/// Complete configuration for one analysis run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding the input volume
    pub input_dir: PathBuf,
    /// File (or slice directory) name inside `input_dir`
    pub filename: String,
    /// Directory receiving exported tables
    pub output_dir: PathBuf,
    /// Physical edge length of one voxel in micrometres
    pub resolution: f64,
    /// Sub-volume scales as percent of the shortest axis, in processing order
    pub scales: Vec<f64>,
    /// Whether to process all scales or only the first
    pub mode: RunMode,
    /// Persistence and retention flags
    pub output: OutputOptions,
    /// Segmentation engine selection
    pub segmenter: SegmenterSettings,
}

impl RunConfig {
    /// Create a configuration with default scales, mode and outputs
    pub fn new(input_dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        let input_dir = input_dir.into();
        Self {
            output_dir: input_dir.clone(),
            input_dir,
            filename: filename.into(),
            resolution: DEFAULT_RESOLUTION_UM,
            scales: DEFAULT_SCALES.to_vec(),
            mode: RunMode::default(),
            output: OutputOptions::default(),
            segmenter: SegmenterSettings::default(),
        }
    }

    /// Full path of the input volume
    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(&self.filename)
    }

    /// Filename stem used to name exported tables
    pub fn output_stem(&self) -> String {
        Path::new(&self.filename)
            .file_stem()
            .map_or_else(|| self.filename.clone(), |s| s.to_string_lossy().to_string())
    }

    /// Check the parameters that do not depend on the volume
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The resolution is not a positive finite number
    /// - No scales were requested
    /// - The filename is empty
    pub fn validate(&self) -> Result<()> {
        crate::math::units::validate_resolution(self.resolution)?;
        if self.scales.is_empty() {
            return Err(invalid_parameter(
                "scales",
                &"[]",
                &"at least one scale is required",
            ));
        }
        if self.filename.is_empty() {
            return Err(invalid_parameter(
                "filename",
                &"",
                &"an input filename is required",
            ));
        }
        Ok(())
    }
}
