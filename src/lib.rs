//! Merge separately acquired `(x, y)` series and resample them onto a
//! fixed number of uniform x-bins.
//!
//! The typical flow is [`combine`] followed by [`binning`]:
//!
//! ```
//! use rebin::{Mode, Series, binning, combine};
//!
//! let a = Series::scalar(vec![3.0, 1.0], vec![30.0, 10.0]).unwrap();
//! let b = Series::scalar(vec![4.0, 2.0], vec![40.0, 20.0]).unwrap();
//!
//! let merged = combine(&[a, b]).unwrap();
//! assert_eq!(merged.x(), &[1.0, 2.0, 3.0, 4.0]);
//!
//! let resampled = binning(&merged, 2, Mode::In).unwrap();
//! assert_eq!(resampled.y(), &[15.0, 35.0]);
//! ```

pub mod binning;
pub mod error;
pub mod merge;
pub mod observer;
pub mod series;

pub use binning::{Mode, binning, binning_slices, binning_with, edges};
pub use error::{ResampleError, Result};
pub use merge::{combine, combine_slices};
pub use observer::{BinObserver, BinRecorder, BinReport, BinSummary, LogObserver, NoObserver};
pub use series::Series;
