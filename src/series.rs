//! Sample series data type.

use crate::error::{ResampleError, Result};
use serde::{Deserialize, Serialize};

/// Series of samples with `n_chan` y-values per x-value.
///
/// The y-values are stored row-major: the channels paired with `x[i]` are
/// `y[i * n_chan..(i + 1) * n_chan]`. A scalar series has `n_chan == 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    x: Vec<f64>,
    y: Vec<f64>,
    n_chan: usize,
}

impl Series {
    /// Create a new series, checking that `y` holds `n_chan` values per x-value.
    pub fn new(x: Vec<f64>, y: Vec<f64>, n_chan: usize) -> Result<Self> {
        let series = Self { x, y, n_chan };
        series.validate()?;
        Ok(series)
    }

    /// Create a new series with one y-value per x-value.
    pub fn scalar(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        Self::new(x, y, 1)
    }

    /// Check the shape invariants.
    ///
    /// Needed after deserialization, which bypasses [`Series::new`].
    pub fn validate(&self) -> Result<()> {
        if self.n_chan == 0 {
            return Err(ResampleError::ShapeMismatch(
                "number of channels must be at least 1".into(),
            ));
        }
        let exp_len = self.x.len() * self.n_chan;
        if self.y.len() != exp_len {
            return Err(ResampleError::ShapeMismatch(format!(
                "y length must be {exp_len} ({} x-values times {} channels), but is {}",
                self.x.len(),
                self.n_chan,
                self.y.len()
            )));
        }
        Ok(())
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn n_chan(&self) -> usize {
        self.n_chan
    }

    /// Number of samples (x-values).
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Get the y-values paired with the `i`-th x-value.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.y[i * self.n_chan..(i + 1) * self.n_chan]
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }
}
