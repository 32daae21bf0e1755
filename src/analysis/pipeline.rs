//! Multi-scale REV and PSD extraction
//!
//! The pipeline preprocesses a volume once, then for each requested scale crops
//! an origin-anchored cube, partitions its pore space, records a REV point and
//! converts every pore to an equivalent-sphere radius. Results are handed to a
//! [`ResultSink`] as they are produced; any sink error aborts the run.

use crate::analysis::psd::{PsdSummary, pore_size_distribution};
use crate::analysis::rev::{RevPoint, RevTrace};
use crate::io::configuration::{RunConfig, RunMode};
use crate::io::error::{Result, WithContext, invalid_parameter};
use crate::segment::engine::{PoreSegmenter, build_segmenter, partition};
use crate::volume::image::{VolumeImage, VolumeSummary};
use crate::volume::sampler::{edge_length, sample};
use log::{info, warn};
use ndarray::{Array, Dimension};
use num_traits::{PrimInt, Unsigned};

/// Everything computed for one scale
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleResult {
    /// Requested scale as percent of the shortest axis
    pub fraction: f64,
    /// Edge length of the analysed cube in voxels
    pub edge: usize,
    /// REV point of the cube
    pub point: RevPoint,
    /// Number of pores found in the cube
    pub pore_count: usize,
    /// Equivalent-sphere radius of every pore, in engine order
    pub psd: Vec<f64>,
    /// Descriptive statistics of the radii
    pub summary: Option<PsdSummary>,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Whole-volume quantities
    pub volume: VolumeSummary,
    /// Per-scale results in processing order
    pub scales: Vec<ScaleResult>,
    /// REV trace, whole image first
    pub trace: RevTrace,
}

impl RunReport {
    /// Radii of the first processed scale
    pub fn first_psd(&self) -> Option<&[f64]> {
        self.scales.first().map(|result| result.psd.as_slice())
    }
}

/// Receives results as the pipeline produces them
pub trait ResultSink {
    /// Called once after preprocessing, before any scale is processed
    ///
    /// # Errors
    ///
    /// Returns an error to abort the run
    fn run_started(&mut self, _volume: &VolumeSummary, _scale_count: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each scale, before the next one starts
    ///
    /// # Errors
    ///
    /// Returns an error to abort the run
    fn scale_completed(&mut self, result: &ScaleResult) -> Result<()>;

    /// Called once with the final REV trace
    ///
    /// # Errors
    ///
    /// Returns an error to abort the run
    fn trace_completed(&mut self, trace: &RevTrace) -> Result<()>;
}

/// Sink that discards every result
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExport;

impl ResultSink for NoExport {
    fn scale_completed(&mut self, _result: &ScaleResult) -> Result<()> {
        Ok(())
    }

    fn trace_completed(&mut self, _trace: &RevTrace) -> Result<()> {
        Ok(())
    }
}

/// Sequences preprocessing, sampling, partitioning and REV accounting over scales
pub struct Pipeline {
    segmenter: Box<dyn PoreSegmenter>,
    scales: Vec<f64>,
    mode: RunMode,
    retain_psd: bool,
}

impl Pipeline {
    /// Create a pipeline over the given scales
    ///
    /// # Errors
    ///
    /// Returns an error if no scales are given
    pub fn new(
        segmenter: Box<dyn PoreSegmenter>,
        scales: Vec<f64>,
        mode: RunMode,
    ) -> Result<Self> {
        if scales.is_empty() {
            return Err(invalid_parameter(
                "scales",
                &"[]",
                &"at least one scale is required",
            ));
        }
        Ok(Self {
            segmenter,
            scales,
            mode,
            retain_psd: true,
        })
    }

    /// Build the pipeline described by a run configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let segmenter = build_segmenter(
            config.segmenter.kind,
            config.segmenter.connectivity,
            config.segmenter.min_peak_distance,
        )?;
        let mut pipeline = Self::new(segmenter, config.scales.clone(), config.mode)?;
        pipeline.retain_psd = config.output.retain_psd;
        Ok(pipeline)
    }

    /// Drop per-scale radii from the returned report once the sink has seen them
    #[must_use]
    pub const fn without_retained_psd(mut self) -> Self {
        self.retain_psd = false;
        self
    }

    /// Requested scales in processing order
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Iteration scope of a run
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// Preprocess a decoded scan and run every scale over it
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, any scale, or the sink fails
    pub fn run<T, D>(
        &self,
        raw: &Array<T, D>,
        resolution: f64,
        sink: &mut dyn ResultSink,
    ) -> Result<RunReport>
    where
        T: PrimInt + Unsigned,
        D: Dimension,
    {
        let volume = VolumeImage::preprocess(raw, resolution)?;
        self.run_volume(&volume, sink)
    }

    /// Run every scale over an already preprocessed volume
    ///
    /// All scales are validated against the volume before any partitioning starts.
    /// In [`RunMode::FirstScale`] only the first scale is processed.
    ///
    /// # Errors
    ///
    /// Returns an error if a scale is out of range or degenerate, partitioning fails,
    /// or the sink fails
    pub fn run_volume(
        &self,
        volume: &VolumeImage,
        sink: &mut dyn ResultSink,
    ) -> Result<RunReport> {
        let planned = match self.mode {
            RunMode::AllScales => self.scales.len(),
            RunMode::FirstScale => 1,
        };
        let scales = self.scales.get(..planned).unwrap_or(&self.scales);
        for &fraction in scales {
            edge_length(volume.shortest_axis(), fraction)?;
        }

        let summary = volume.summary();
        info!(
            "whole image {}x{}x{}: porosity {:.4}, volume {:.6} mm^3",
            summary.dims.0, summary.dims.1, summary.dims.2, summary.porosity, summary.volume_mm3
        );

        let mut trace = RevTrace::new(summary.rev_point());
        sink.run_started(&summary, scales.len())?;

        let mut results = Vec::with_capacity(scales.len());
        for &fraction in scales {
            let mut result = self
                .process_scale(volume, fraction, &mut trace)
                .with_scale(fraction)?;
            sink.scale_completed(&result)?;
            if !self.retain_psd {
                result.psd = Vec::new();
            }
            results.push(result);
        }

        sink.trace_completed(&trace)?;

        Ok(RunReport {
            volume: summary,
            scales: results,
            trace,
        })
    }

    fn process_scale(
        &self,
        volume: &VolumeImage,
        fraction: f64,
        trace: &mut RevTrace,
    ) -> Result<ScaleResult> {
        let sub_volume = sample(volume, fraction)?;
        let regions = partition(self.segmenter.as_ref(), &sub_volume)?;
        let point = trace.record(sub_volume.edge(), &regions, volume.resolution())?;
        let psd = pore_size_distribution(&regions, volume.resolution());
        let summary = PsdSummary::from_radii(&psd);

        if regions.is_empty() {
            warn!("no pores found at scale {fraction}%");
        }
        info!(
            "scale {fraction}% ({edge}^3 voxels): porosity {:.4}, volume {:.6} mm^3, {} pores",
            point.porosity,
            point.volume_mm3,
            regions.len(),
            edge = sub_volume.edge()
        );

        Ok(ScaleResult {
            fraction,
            edge: sub_volume.edge(),
            point,
            pore_count: regions.len(),
            psd,
            summary,
        })
    }
}
