use crate::error::{ResampleError, Result};
use crate::observer::{BinObserver, BinSummary, NoObserver};
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Bin edge placement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// First and last edges coincide with the first and last x-values.
    In,
    /// First and last x-values sit at the centers of the first and last bins.
    Out,
}

impl FromStr for Mode {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(ResampleError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("in"),
            Self::Out => f.write_str("out"),
        }
    }
}

/// Compute the `n_bins + 1` edges of uniform bins covering `[x_first, x_last]`.
///
/// Bins are right-closed, `(edges[j], edges[j + 1]]`. In [`Mode::In`] the
/// first edge sits one rounding step below `x_first` so that `x_first` falls
/// into the first bin; a single x-value (`x_first == x_last`) then gives one
/// bin of that width. In [`Mode::Out`] the range is padded by half a bin on
/// each side, which needs `x_last > x_first`.
pub fn edges(x_first: f64, x_last: f64, n_bins: usize, mode: Mode) -> Result<Vec<f64>> {
    if n_bins == 0 {
        return Err(ResampleError::InvalidArgument(
            "number of bins must be at least 1".into(),
        ));
    }
    if !x_first.is_finite() || !x_last.is_finite() {
        return Err(ResampleError::InvalidArgument(format!(
            "x range must be finite, but is [{x_first}, {x_last}]"
        )));
    }
    if x_last < x_first {
        return Err(ResampleError::InvalidArgument(format!(
            "x range must be ascending, but is [{x_first}, {x_last}]"
        )));
    }

    let span = x_last - x_first;
    let (lo, hi) = match mode {
        Mode::In => {
            if span == 0.0 && n_bins > 1 {
                return Err(ResampleError::InvalidArgument(format!(
                    "a single x-value {x_first} fits only one bin, but {n_bins} were requested"
                )));
            }
            // Between one and two ulps of x_first, at any magnitude.
            let eps = x_first.abs().max(f64::MIN_POSITIVE) * f64::EPSILON;
            (x_first - eps, x_last)
        }
        Mode::Out => {
            if span == 0.0 {
                return Err(ResampleError::InvalidArgument(format!(
                    "x range must not be empty in mode out, but is [{x_first}, {x_last}]"
                )));
            }
            let step = if n_bins == 1 {
                span
            } else {
                span / (n_bins - 1) as f64
            };
            (x_first - step / 2.0, x_last + step / 2.0)
        }
    };

    let width = hi - lo;
    let resolution = lo.abs().max(hi.abs()).max(f64::MIN_POSITIVE) * f64::EPSILON / 4.0;
    if !width.is_finite() || width / (n_bins as f64) < resolution {
        return Err(ResampleError::InvalidArgument(format!(
            "{n_bins} bins are too many to resolve the x range [{x_first}, {x_last}]"
        )));
    }

    let mut edges: Vec<f64> = (0..=n_bins)
        .map(|j| lo + width * j as f64 / n_bins as f64)
        .collect();
    edges[0] = lo;
    edges[n_bins] = hi;

    if !edges.windows(2).all(|pair| pair[0] < pair[1]) {
        return Err(ResampleError::InvalidArgument(format!(
            "{n_bins} bins are too many to resolve the x range [{x_first}, {x_last}]"
        )));
    }

    Ok(edges)
}

/// Resample a sorted series onto `n_bins` uniform bins.
///
/// Returns a series of bin centers paired with the mean y-values of the
/// samples in each bin. Empty bins get NaN in every channel.
pub fn binning(series: &Series, n_bins: usize, mode: Mode) -> Result<Series> {
    binning_with(series, n_bins, mode, &mut NoObserver)
}

/// Same as [`binning`], handing the bin summary to `observer` before returning.
pub fn binning_with(
    series: &Series,
    n_bins: usize,
    mode: Mode,
    observer: &mut dyn BinObserver,
) -> Result<Series> {
    series.validate().map_err(|err| match err {
        ResampleError::ShapeMismatch(msg) => ResampleError::InvalidArgument(msg),
        other => other,
    })?;

    let x = series.x();
    let y = series.y();
    let n_chan = series.n_chan();

    let (Some(&x_first), Some(&x_last)) = (x.first(), x.last()) else {
        return Err(ResampleError::InvalidArgument(
            "series must not be empty".into(),
        ));
    };
    if !x.is_sorted_by(|a, b| a <= b) {
        return Err(ResampleError::InvalidArgument(
            "x values must be sorted in ascending order".into(),
        ));
    }

    let edges = edges(x_first, x_last, n_bins, mode)?;
    log::debug!(
        "binning {} samples into {n_bins} bins over [{}, {}] (mode {mode})",
        x.len(),
        edges[0],
        edges[n_bins]
    );

    let mut centers = Vec::with_capacity(n_bins);
    let mut means = Vec::with_capacity(n_bins * n_chan);
    let mut counts = Vec::with_capacity(n_bins);

    // Samples of each bin form a contiguous run starting at `start`.
    let mut start = 0;
    for bin in edges.windows(2) {
        let (left, right) = (bin[0], bin[1]);

        let end = start + x[start..].iter().take_while(|&&val| val <= right).count();
        let count = end - start;

        centers.push(0.5 * (left + right));
        counts.push(count);

        if count == 0 {
            means.extend(std::iter::repeat_n(f64::NAN, n_chan));
            continue;
        }
        for i_chan in 0..n_chan {
            let sum: f64 = (start..end).map(|i| y[i * n_chan + i_chan]).sum();
            means.push(sum / count as f64);
        }
        start = end;
    }
    debug_assert_eq!(start, x.len());

    observer.observe(&BinSummary {
        x,
        y,
        n_chan,
        edges: &edges,
        centers: &centers,
        means: &means,
        counts: &counts,
    });

    Series::new(centers, means, n_chan)
}

/// Resample parallel x- and y-slices with `n_chan` y-values per x-value.
///
/// `mode` must be `"in"` or `"out"`.
pub fn binning_slices(
    x: &[f64],
    y: &[f64],
    n_chan: usize,
    n_bins: usize,
    mode: &str,
) -> Result<Series> {
    let mode = mode.parse::<Mode>()?;
    let series = Series::new(x.to_vec(), y.to_vec(), n_chan).map_err(|err| match err {
        ResampleError::ShapeMismatch(msg) => ResampleError::InvalidArgument(msg),
        other => other,
    })?;
    binning(&series, n_bins, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::BinRecorder;

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len(), "{a:?} vs {b:?}");
        for (va, vb) in a.iter().zip(b) {
            assert!((va - vb).abs() <= tol, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn in_mode_two_bins() {
        let series =
            Series::scalar(vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 20.0, 30.0, 40.0]).unwrap();

        let resampled = binning(&series, 2, Mode::In).unwrap();

        assert_close(resampled.x(), &[1.75, 3.25], 1e-9);
        assert_eq!(resampled.y(), &[15.0, 35.0]);
    }

    #[test]
    fn in_mode_edges_match_data_range() {
        let edges = edges(1.0, 4.0, 2, Mode::In).unwrap();

        assert_eq!(edges.len(), 3);
        assert!(edges[0] < 1.0);
        assert!(1.0 - edges[0] < 1e-12);
        assert!((edges[1] - 2.5).abs() < 1e-12);
        assert_eq!(edges[2], 4.0);
    }

    #[test]
    fn in_mode_first_edge_hugs_first_sample_at_any_scale() {
        for x_first in [0.0_f64, -3.0, 1e12, -1e12, 1e-18, -1e-300] {
            let span = x_first.abs().max(1e-300);
            let edges = edges(x_first, x_first + span, 4, Mode::In).unwrap();
            assert!(edges[0] < x_first);
            assert!(x_first - edges[0] <= 1e-12 * span, "{x_first}: {edges:?}");
        }
    }

    #[test]
    fn in_mode_two_bins_at_tiny_scale() {
        let scale: f64 = 1e-18;
        let x = [1.0, 2.0, 3.0, 4.0].map(|val| val * scale).to_vec();
        let series = Series::scalar(x, vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        let mut recorder = BinRecorder::new();

        let resampled = binning_with(&series, 2, Mode::In, &mut recorder).unwrap();

        assert_eq!(recorder.report().unwrap().counts, vec![2, 2]);
        assert_eq!(resampled.y(), &[15.0, 35.0]);
        assert_close(resampled.x(), &[1.75 * scale, 3.25 * scale], 1e-12 * scale);
    }

    #[test]
    fn in_mode_accepts_a_single_x_value() {
        let single = Series::scalar(vec![2.0], vec![7.0]).unwrap();
        let resampled = binning(&single, 1, Mode::In).unwrap();
        assert_eq!(resampled.y(), &[7.0]);
        assert_close(resampled.x(), &[2.0], 1e-12);

        let repeated = Series::scalar(vec![2.0, 2.0], vec![1.0, 3.0]).unwrap();
        let resampled = binning(&repeated, 1, Mode::In).unwrap();
        assert_eq!(resampled.y(), &[2.0]);

        let at_zero = Series::scalar(vec![0.0], vec![4.0]).unwrap();
        let resampled = binning(&at_zero, 1, Mode::In).unwrap();
        assert_eq!(resampled.y(), &[4.0]);
    }

    #[test]
    fn single_x_value_rejected_where_bins_are_undefined() {
        let single = Series::scalar(vec![2.0], vec![7.0]).unwrap();

        let err = binning(&single, 1, Mode::Out).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidArgument(_)), "{err}");

        let err = binning(&single, 2, Mode::In).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidArgument(_)), "{err}");
    }

    #[test]
    fn unresolvable_bin_counts_are_rejected() {
        for mode in [Mode::In, Mode::Out] {
            let err = edges(0.0, 1.0, usize::MAX, mode).unwrap_err();
            assert!(matches!(err, ResampleError::InvalidArgument(_)), "{err}");

            let err = edges(1e15, 1e15 + 1.0, 1 << 20, mode).unwrap_err();
            assert!(matches!(err, ResampleError::InvalidArgument(_)), "{err}");
        }
        assert_eq!(edges(0.0, 1.0, 1 << 20, Mode::In).unwrap().len(), (1 << 20) + 1);
    }

    #[test]
    fn out_mode_centers_end_points() {
        let edges = edges(1.0, 10.0, 3, Mode::Out).unwrap();
        assert_close(&edges, &[-1.25, 3.25, 7.75, 12.25], 1e-12);
    }

    #[test]
    fn out_mode_empty_middle_bin() {
        let series = Series::scalar(vec![1.0, 10.0], vec![5.0, 50.0]).unwrap();
        let mut recorder = BinRecorder::new();

        let resampled = binning_with(&series, 3, Mode::Out, &mut recorder).unwrap();

        assert_close(resampled.x(), &[1.0, 5.5, 10.0], 1e-12);
        assert_eq!(resampled.y()[0], 5.0);
        assert!(resampled.y()[1].is_nan());
        assert_eq!(resampled.y()[2], 50.0);

        let report = recorder.report().unwrap();
        assert_eq!(report.counts, vec![1, 0, 1]);
    }

    #[test]
    fn single_bin_gives_overall_mean() {
        let series = Series::scalar(vec![0.0, 1.0, 5.0, 6.0], vec![1.0, 2.0, 3.0, 6.0]).unwrap();

        for mode in [Mode::In, Mode::Out] {
            let resampled = binning(&series, 1, mode).unwrap();
            assert_eq!(resampled.len(), 1);
            assert_eq!(resampled.y(), &[3.0]);
        }

        let resampled = binning(&series, 1, Mode::Out).unwrap();
        assert_close(resampled.x(), &[3.0], 1e-12);
    }

    #[test]
    fn pass_through_when_bins_match_samples() {
        let x: Vec<f64> = (0..8).map(f64::from).collect();
        let y = vec![3.0, -1.0, 4.0, 1.0, -5.0, 9.0, 2.0, 6.0];
        let series = Series::scalar(x, y.clone()).unwrap();
        let mut recorder = BinRecorder::new();

        let resampled = binning_with(&series, 8, Mode::In, &mut recorder).unwrap();

        assert_eq!(resampled.y(), y.as_slice());
        assert_eq!(recorder.report().unwrap().counts, vec![1; 8]);
    }

    #[test]
    fn means_are_taken_per_channel() {
        let series = Series::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![1.0, 10.0, 3.0, 30.0, 5.0, 50.0, 7.0, 70.0],
            2,
        )
        .unwrap();

        let resampled = binning(&series, 2, Mode::In).unwrap();

        assert_eq!(resampled.n_chan(), 2);
        assert_eq!(resampled.row(0), &[2.0, 20.0]);
        assert_eq!(resampled.row(1), &[6.0, 60.0]);
    }

    #[test]
    fn empty_bins_are_nan_in_every_channel() {
        let series = Series::new(vec![0.0, 4.0], vec![1.0, 2.0, 3.0, 4.0], 2).unwrap();

        let resampled = binning(&series, 3, Mode::Out).unwrap();

        assert!(resampled.row(1).iter().all(|val| val.is_nan()));
        assert_eq!(resampled.row(2), &[3.0, 4.0]);
    }

    #[test]
    fn repeated_x_values_are_accepted() {
        let series = Series::scalar(vec![1.0, 1.0, 2.0, 2.0], vec![1.0, 3.0, 5.0, 7.0]).unwrap();

        let resampled = binning(&series, 2, Mode::In).unwrap();

        assert_eq!(resampled.y(), &[2.0, 6.0]);
    }

    #[test]
    fn rejects_invalid_arguments() {
        let sorted = Series::scalar(vec![1.0, 2.0], vec![1.0, 2.0]).unwrap();
        let unsorted = Series::scalar(vec![2.0, 1.0], vec![1.0, 2.0]).unwrap();
        let empty = Series::scalar(vec![], vec![]).unwrap();

        for (series, n_bins) in [(&sorted, 0), (&unsorted, 2), (&empty, 1)] {
            let err = binning(series, n_bins, Mode::In).unwrap_err();
            assert!(matches!(err, ResampleError::InvalidArgument(_)), "{err}");
        }
    }

    #[test]
    fn slices_check_length_and_mode() {
        let err = binning_slices(&[1.0, 2.0], &[1.0], 1, 1, "in").unwrap_err();
        assert!(matches!(err, ResampleError::InvalidArgument(_)));

        let err = binning_slices(&[1.0, 2.0], &[1.0, 2.0], 1, 1, "middle").unwrap_err();
        assert_eq!(err, ResampleError::UnsupportedMode("middle".into()));

        let resampled = binning_slices(&[1.0, 2.0], &[1.0, 2.0], 1, 1, "out").unwrap();
        assert_eq!(resampled.y(), &[1.5]);
    }

    #[test]
    fn mode_round_trips_through_strings() {
        for mode in [Mode::In, Mode::Out] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }
}
