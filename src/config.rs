use anyhow::{Context, Result, bail};
use rebin::Mode;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Input dataset parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Number of y-values per x-value in every dataset.
    pub n_chan: usize,
}

/// Resampling parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Number of bins of the resampled series.
    pub n_bins: usize,
    /// Bin edge placement mode.
    pub mode: Mode,
}

/// Tool configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub binning: BinningConfig,
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.input.n_chan, 1..1_000).context("invalid number of channels")?;
        check_num(self.binning.n_bins, 1..10_000_000).context("invalid number of bins")?;
        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_validates() {
        let config: Config = toml::from_str(
            "[input]\nn_chan = 2\n\n[binning]\nn_bins = 16\nmode = \"out\"\n",
        )
        .unwrap();

        assert_eq!(config.input.n_chan, 2);
        assert_eq!(config.binning.mode, Mode::Out);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_bins() {
        let config: Config =
            toml::from_str("[input]\nn_chan = 1\n\n[binning]\nn_bins = 0\nmode = \"in\"\n")
                .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_mode() {
        let result: Result<Config, _> =
            toml::from_str("[input]\nn_chan = 1\n\n[binning]\nn_bins = 4\nmode = \"mid\"\n");

        assert!(result.is_err());
    }
}
