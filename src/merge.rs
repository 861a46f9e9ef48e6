use crate::error::{ResampleError, Result};
use crate::series::Series;
use std::cmp::Ordering;

/// Merge several series into one series sorted by x.
///
/// Samples are ordered lexicographically on `(x, y-row)`, comparing the
/// y-row channel by channel. Repeated x-values are kept as separate samples.
/// All series must share the same number of channels.
pub fn combine(datasets: &[Series]) -> Result<Series> {
    let Some(first) = datasets.first() else {
        return Series::scalar(Vec::new(), Vec::new());
    };
    let n_chan = first.n_chan();

    for (i_set, set) in datasets.iter().enumerate() {
        set.validate()?;
        if set.n_chan() != n_chan {
            return Err(ResampleError::ShapeMismatch(format!(
                "dataset {i_set} has {} channels, but dataset 0 has {n_chan}",
                set.n_chan()
            )));
        }
    }

    let n_samples: usize = datasets.iter().map(Series::len).sum();
    let mut x_cat = Vec::with_capacity(n_samples);
    let mut y_cat = Vec::with_capacity(n_samples * n_chan);
    for set in datasets {
        x_cat.extend_from_slice(set.x());
        y_cat.extend_from_slice(set.y());
    }

    let row = |i: usize| &y_cat[i * n_chan..(i + 1) * n_chan];

    let mut order: Vec<usize> = (0..n_samples).collect();
    order.sort_by(|&a, &b| {
        x_cat[a]
            .total_cmp(&x_cat[b])
            .then_with(|| cmp_rows(row(a), row(b)))
    });

    let x_merged = order.iter().map(|&i| x_cat[i]).collect();
    let mut y_merged = Vec::with_capacity(y_cat.len());
    for &i in &order {
        y_merged.extend_from_slice(row(i));
    }

    log::debug!(
        "merged {} datasets into {n_samples} samples",
        datasets.len()
    );

    Series::new(x_merged, y_merged, n_chan)
}

/// Merge parallel x- and y-slices, with `n_chan` y-values per x-value.
///
/// Same as [`combine`], for callers holding raw slices.
pub fn combine_slices(xs: &[&[f64]], ys: &[&[f64]], n_chan: usize) -> Result<Series> {
    if xs.len() != ys.len() {
        return Err(ResampleError::ShapeMismatch(format!(
            "got {} x-series but {} y-series",
            xs.len(),
            ys.len()
        )));
    }

    let datasets = xs
        .iter()
        .zip(ys)
        .enumerate()
        .map(|(i_set, (x, y))| {
            Series::new(x.to_vec(), y.to_vec(), n_chan).map_err(|err| match err {
                ResampleError::ShapeMismatch(msg) => {
                    ResampleError::ShapeMismatch(format!("dataset {i_set}: {msg}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    combine(&datasets)
}

fn cmp_rows(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(va, vb)| va.total_cmp(vb))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}
