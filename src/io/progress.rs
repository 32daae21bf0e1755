//! Scale-by-scale progress display wrapped around a result sink

use crate::analysis::pipeline::{ResultSink, ScaleResult};
use crate::analysis::rev::RevTrace;
use crate::io::configuration::PROGRESS_BAR_WIDTH;
use crate::io::error::Result;
use crate::volume::VolumeSummary;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static SCALE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Scales: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Forwards results to an inner sink while advancing a progress bar per scale
///
/// The bar is created when the run starts and finished when the trace completes.
pub struct ProgressSink<S> {
    inner: S,
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl<S: ResultSink> ProgressSink<S> {
    /// Wrap a sink with a visible progress bar
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            bar: None,
            hidden: false,
        }
    }

    /// Wrap a sink without drawing anything
    pub const fn hidden(inner: S) -> Self {
        Self {
            inner,
            bar: None,
            hidden: true,
        }
    }

    /// The wrapped sink
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the inner sink
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Position of the bar, `None` before the run starts or after it finishes
    pub fn position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }
}

impl<S: ResultSink> ResultSink for ProgressSink<S> {
    fn run_started(&mut self, volume: &VolumeSummary, scale_count: usize) -> Result<()> {
        self.inner.run_started(volume, scale_count)?;

        let bar = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(scale_count as u64)
        };
        bar.set_length(scale_count as u64);
        bar.set_style(SCALE_STYLE.clone());
        bar.set_message(format!("whole image porosity {:.4}", volume.porosity));
        self.bar = Some(bar);
        Ok(())
    }

    fn scale_completed(&mut self, result: &ScaleResult) -> Result<()> {
        self.inner.scale_completed(result)?;
        if let Some(ref bar) = self.bar {
            bar.set_message(format!(
                "{}% porosity {:.4}, {} pores",
                result.fraction, result.point.porosity, result.pore_count
            ));
            bar.inc(1);
        }
        Ok(())
    }

    fn trace_completed(&mut self, trace: &RevTrace) -> Result<()> {
        self.inner.trace_completed(trace)?;
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(format!("{} REV points", trace.len()));
        }
        Ok(())
    }
}
