//! Inspection hook for binning results.

use serde::{Deserialize, Serialize};

/// Everything the binner knows about one call, borrowed for inspection.
#[derive(Debug, Clone, Copy)]
pub struct BinSummary<'a> {
    /// Input x-values.
    pub x: &'a [f64],
    /// Input y-values, row-major with `n_chan` values per x-value.
    pub y: &'a [f64],
    pub n_chan: usize,
    /// Bin edges (`n_bins + 1` values).
    pub edges: &'a [f64],
    /// Geometric bin centers.
    pub centers: &'a [f64],
    /// Mean y-values per bin, row-major (NaN for empty bins).
    pub means: &'a [f64],
    /// Number of samples in each bin.
    pub counts: &'a [usize],
}

/// Consumer of binning results, such as a plotting or debugging front end.
///
/// Observers see the data after it has been computed and cannot alter it.
pub trait BinObserver {
    fn observe(&mut self, summary: &BinSummary<'_>);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl BinObserver for NoObserver {
    fn observe(&mut self, _summary: &BinSummary<'_>) {}
}

/// Observer that writes one line per bin to the log.
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    level: log::Level,
}

impl LogObserver {
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(log::Level::Debug)
    }
}

impl BinObserver for LogObserver {
    fn observe(&mut self, summary: &BinSummary<'_>) {
        let level = self.level;
        let n_chan = summary.n_chan;
        log::log!(
            level,
            "{} samples in {} bins",
            summary.x.len(),
            summary.counts.len()
        );
        log::log!(level, "       left       right      center  count  mean");
        for (i_bin, &count) in summary.counts.iter().enumerate() {
            let mean = &summary.means[i_bin * n_chan..(i_bin + 1) * n_chan];
            log::log!(
                level,
                " {:>11.4e} {:>11.4e} {:>11.4e} {count:>6}  {mean:.4?}",
                summary.edges[i_bin],
                summary.edges[i_bin + 1],
                summary.centers[i_bin],
            );
        }
    }
}

/// Owned copy of a [`BinSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinReport {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub n_chan: usize,
    pub edges: Vec<f64>,
    pub centers: Vec<f64>,
    pub means: Vec<f64>,
    pub counts: Vec<usize>,
}

impl From<&BinSummary<'_>> for BinReport {
    fn from(summary: &BinSummary<'_>) -> Self {
        Self {
            x: summary.x.to_vec(),
            y: summary.y.to_vec(),
            n_chan: summary.n_chan,
            edges: summary.edges.to_vec(),
            centers: summary.centers.to_vec(),
            means: summary.means.to_vec(),
            counts: summary.counts.to_vec(),
        }
    }
}

/// Observer that keeps a report of the last binning it saw.
#[derive(Debug, Default)]
pub struct BinRecorder {
    report: Option<BinReport>,
}

impl BinRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> Option<&BinReport> {
        self.report.as_ref()
    }

    pub fn into_report(self) -> Option<BinReport> {
        self.report
    }
}

impl BinObserver for BinRecorder {
    fn observe(&mut self, summary: &BinSummary<'_>) {
        self.report = Some(BinReport::from(summary));
    }
}
