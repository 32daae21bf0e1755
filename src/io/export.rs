//! CSV export of PSD and REV tables
//!
//! File naming lives here and only here: one `<stem>_psd_<scale>.csv` per
//! processed scale and a single `<stem>_rev.csv` per run.

use crate::analysis::pipeline::{ResultSink, ScaleResult};
use crate::analysis::rev::RevTrace;
use crate::io::configuration::{OutputOptions, PSD_SUFFIX, REV_SUFFIX, TABLE_EXTENSION};
use crate::io::error::{AnalysisError, Result, WithContext};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct PsdRow {
    radius_um: f64,
}

/// Header of the PSD table
pub const PSD_HEADER: [&str; 1] = ["radius_um"];
/// Header of the REV table
pub const REV_HEADER: [&str; 2] = ["volume_mm3", "porosity"];

/// Path of the PSD table for one scale
pub fn psd_path(output_dir: &Path, stem: &str, fraction: f64) -> PathBuf {
    output_dir.join(format!("{stem}{PSD_SUFFIX}_{fraction}.{TABLE_EXTENSION}"))
}

/// Path of the REV table
pub fn rev_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{stem}{REV_SUFFIX}.{TABLE_EXTENSION}"))
}

/// Write one radius per row under a `radius_um` header
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file cannot be written
pub fn write_psd(path: &Path, radii: &[f64]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record(PSD_HEADER).with_path(path)?;
    for &radius_um in radii {
        writer.serialize(PsdRow { radius_um }).with_path(path)?;
    }
    flush(writer, path)
}

/// Write one REV point per row, whole image first
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file cannot be written
pub fn write_rev(path: &Path, trace: &RevTrace) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record(REV_HEADER).with_path(path)?;
    for point in trace.points() {
        writer.serialize(point).with_path(path)?;
    }
    flush(writer, path)
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AnalysisError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_path(path)
}

fn flush(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<()> {
    writer.flush().map_err(|e| AnalysisError::FileSystem {
        path: path.to_path_buf(),
        operation: "flush table",
        source: e,
    })
}

/// Sink persisting PSD and REV tables as CSV files
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    stem: String,
    options: OutputOptions,
    written: Vec<PathBuf>,
}

impl CsvExporter {
    /// Export tables named after `stem` into `output_dir`
    pub fn new(
        output_dir: impl Into<PathBuf>,
        stem: impl Into<String>,
        options: OutputOptions,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            stem: stem.into(),
            options,
            written: Vec::new(),
        }
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ResultSink for CsvExporter {
    fn scale_completed(&mut self, result: &ScaleResult) -> Result<()> {
        if !self.options.save_psd {
            return Ok(());
        }
        let path = psd_path(&self.output_dir, &self.stem, result.fraction);
        write_psd(&path, &result.psd)?;
        info!("wrote {} radii to {}", result.psd.len(), path.display());
        self.written.push(path);
        Ok(())
    }

    fn trace_completed(&mut self, trace: &RevTrace) -> Result<()> {
        if !self.options.save_rev {
            return Ok(());
        }
        let path = rev_path(&self.output_dir, &self.stem);
        write_rev(&path, trace)?;
        info!("wrote {} REV points to {}", trace.len(), path.display());
        self.written.push(path);
        Ok(())
    }
}
