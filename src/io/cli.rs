//! Command-line interface for REV and PSD analysis of micro-CT volumes

use crate::analysis::pipeline::{Pipeline, ResultSink, RunReport};
use crate::io::configuration::{
    DEFAULT_CONNECTIVITY, DEFAULT_MIN_PEAK_DISTANCE, DEFAULT_RESOLUTION_UM, DEFAULT_SCALES,
    DEFAULT_SEED, DEFAULT_SYNTHETIC_POROSITY, DEFAULT_SYNTHETIC_SPHERE_RADIUS, OutputOptions,
    RunConfig, RunMode, SYNTHETIC_STEM, SegmenterSettings,
};
use crate::io::error::{Result, WithContext, invalid_parameter};
use crate::io::export::CsvExporter;
use crate::io::progress::ProgressSink;
use crate::io::volume::load_volume;
use crate::segment::engine::SegmenterKind;
use crate::volume::synthetic::{SyntheticConfig, generate};
use clap::{ArgAction, Parser};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "porerev")]
#[command(
    author,
    version,
    about = "Pore size distribution and REV analysis of binarized micro-CT volumes"
)]
/// Command-line arguments for the analysis tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Multi-page TIFF, slice image, or directory of slice images
    #[arg(value_name = "TARGET", required_unless_present = "synthetic")]
    pub target: Option<PathBuf>,

    /// Physical edge length of one voxel in micrometres
    #[arg(short, long, default_value_t = DEFAULT_RESOLUTION_UM)]
    pub resolution: f64,

    /// Sub-volume scales as percent of the shortest axis
    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_SCALES)]
    pub scales: Vec<f64>,

    /// Directory for exported tables (defaults to the input directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Process only the first scale and stop
    #[arg(long)]
    pub first_scale: bool,

    /// Pore segmentation engine
    #[arg(short, long, value_enum, default_value_t = SegmenterKind::Watershed)]
    pub engine: SegmenterKind,

    /// Voxel neighbourhood size (6, 18 or 26)
    #[arg(short, long, default_value_t = DEFAULT_CONNECTIVITY)]
    pub connectivity: usize,

    /// Minimum separation between watershed markers in voxels
    #[arg(long, default_value_t = DEFAULT_MIN_PEAK_DISTANCE)]
    pub min_peak_distance: usize,

    /// Skip writing per-scale PSD tables
    #[arg(long)]
    pub no_psd: bool,

    /// Skip writing the REV table
    #[arg(long)]
    pub no_rev: bool,

    /// Suppress progress and log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Analyse a generated cubic volume with this edge length instead of TARGET
    #[arg(long, value_name = "EDGE", conflicts_with = "target")]
    pub synthetic: Option<usize>,

    /// Target porosity of the generated volume
    #[arg(long, default_value_t = DEFAULT_SYNTHETIC_POROSITY, requires = "synthetic")]
    pub porosity: f64,

    /// Random seed for the generated volume
    #[arg(long, default_value_t = DEFAULT_SEED, requires = "synthetic")]
    pub seed: u64,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Log verbosity level for `stderrlog` (info by default)
    pub fn log_verbosity(&self) -> usize {
        2 + usize::from(self.verbose)
    }

    /// Persistence flags selected on the command line
    pub const fn output_options(&self) -> OutputOptions {
        OutputOptions {
            save_psd: !self.no_psd,
            save_rev: !self.no_rev,
            retain_psd: true,
        }
    }

    /// Build the run configuration described by the arguments
    ///
    /// # Errors
    ///
    /// Returns an error if neither a target nor a synthetic volume is given, or the
    /// resulting configuration is invalid
    pub fn to_run_config(&self) -> Result<RunConfig> {
        let (input_dir, filename) = match (&self.target, self.synthetic) {
            (Some(target), _) => split_target(target)?,
            (None, Some(_)) => (PathBuf::from("."), SYNTHETIC_STEM.to_string()),
            (None, None) => {
                return Err(invalid_parameter(
                    "target",
                    &"",
                    &"a target volume or --synthetic is required",
                ));
            }
        };

        let mut config = RunConfig::new(input_dir, filename);
        if let Some(ref output_dir) = self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        config.resolution = self.resolution;
        config.scales.clone_from(&self.scales);
        config.mode = if self.first_scale {
            RunMode::FirstScale
        } else {
            RunMode::AllScales
        };
        config.output = self.output_options();
        config.segmenter = SegmenterSettings {
            kind: self.engine,
            connectivity: self.connectivity,
            min_peak_distance: self.min_peak_distance,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parameters of the generated volume, if one was requested
    pub const fn synthetic_config(&self) -> Option<SyntheticConfig> {
        match self.synthetic {
            Some(edge) => Some(SyntheticConfig {
                edge,
                porosity: self.porosity,
                sphere_radius: DEFAULT_SYNTHETIC_SPHERE_RADIUS,
                seed: self.seed,
            }),
            None => None,
        }
    }
}

fn split_target(target: &Path) -> Result<(PathBuf, String)> {
    let filename = target
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| {
            invalid_parameter(
                "target",
                &target.display(),
                &"must name a file or directory",
            )
        })?;
    let input_dir = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((input_dir, filename))
}

/// Loads the requested volume, runs the pipeline and exports the results
pub struct AnalysisRunner {
    cli: Cli,
}

impl AnalysisRunner {
    /// Create a runner for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the analysis described by the CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, decoding, analysis or export fails
    pub fn run(&self) -> Result<RunReport> {
        let config = self.cli.to_run_config()?;
        let pipeline = Pipeline::from_config(&config)?;

        let (raw, source) = match self.cli.synthetic_config() {
            Some(synthetic) => {
                info!(
                    "generating {0}x{0}x{0} synthetic volume (seed {1})",
                    synthetic.edge, synthetic.seed
                );
                (generate(&synthetic)?, None)
            }
            None => {
                let path = config.input_path();
                info!("loading {}", path.display());
                (load_volume(&path)?, Some(path))
            }
        };

        let exporter = CsvExporter::new(&config.output_dir, config.output_stem(), config.output);
        let mut sink: Box<dyn ResultSink> = if self.cli.should_show_progress() {
            Box::new(ProgressSink::new(exporter))
        } else {
            Box::new(exporter)
        };

        let report = pipeline.run(&raw, config.resolution, sink.as_mut());
        match source {
            Some(path) => report.with_path(path),
            None => report,
        }
    }
}
