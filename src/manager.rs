use crate::config::Config;
use anyhow::{Context, Result, bail};
use glob::glob;
use rebin::{BinObserver, BinRecorder, BinSummary, LogObserver, NoObserver, Series};
use rmp_serde::{decode, encode};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(data_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { data_dir, cfg })
    }

    pub fn merge_datasets(&self) -> Result<()> {
        let files = self.dataset_files().context("failed to list dataset files")?;
        if files.is_empty() {
            bail!("no dataset files found in {:?}", self.data_dir);
        }

        let mut datasets = Vec::with_capacity(files.len());
        for file in &files {
            let series: Series =
                read_msgpack(file).with_context(|| format!("failed to load {file:?}"))?;
            series
                .validate()
                .with_context(|| format!("invalid dataset {file:?}"))?;
            if series.n_chan() != self.cfg.input.n_chan {
                bail!(
                    "dataset {file:?} has {} channels, but the config expects {}",
                    series.n_chan(),
                    self.cfg.input.n_chan
                );
            }
            log::info!("loaded {file:?} ({} samples)", series.len());
            datasets.push(series);
        }

        let merged = rebin::combine(&datasets).context("failed to merge datasets")?;

        let merged_file = self.merged_file();
        write_msgpack(&merged_file, &merged)
            .with_context(|| format!("failed to save {merged_file:?}"))?;
        log::info!("merged {} samples into {merged_file:?}", merged.len());

        Ok(())
    }

    pub fn resample_merged(&self, debug: bool) -> Result<()> {
        let merged_file = self.merged_file();
        let merged: Series = read_msgpack(&merged_file)
            .with_context(|| format!("failed to load {merged_file:?}"))?;

        let n_bins = self.cfg.binning.n_bins;
        let mode = self.cfg.binning.mode;

        let mut inspector = Inspector::new();
        let mut quiet = NoObserver;
        let observer: &mut dyn BinObserver = if debug { &mut inspector } else { &mut quiet };
        let resampled = rebin::binning_with(&merged, n_bins, mode, observer)
            .context("failed to resample merged series")?;

        let resampled_file = self.resampled_file();
        write_msgpack(&resampled_file, &resampled)
            .with_context(|| format!("failed to save {resampled_file:?}"))?;
        log::info!("resampled into {n_bins} bins in {resampled_file:?}");

        if let Some(report) = inspector.recorder.into_report() {
            let bins_file = self.bins_file();
            write_msgpack(&bins_file, &report)
                .with_context(|| format!("failed to save {bins_file:?}"))?;
            log::info!("saved bin report to {bins_file:?}");
        }

        Ok(())
    }

    pub fn clean_outputs(&self) -> Result<()> {
        for file in [self.merged_file(), self.resampled_file(), self.bins_file()] {
            if file.exists() {
                fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
                log::info!("removed {file:?}");
            }
        }
        Ok(())
    }

    fn dataset_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.data_dir.join("dataset-*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut files: Vec<_> = glob(pattern)
            .context("failed to glob dataset files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    fn merged_file(&self) -> PathBuf {
        self.data_dir.join("merged.msgpack")
    }

    fn resampled_file(&self) -> PathBuf {
        self.data_dir.join("resampled.msgpack")
    }

    fn bins_file(&self) -> PathBuf {
        self.data_dir.join("bins.msgpack")
    }
}

/// Logs the bin table and keeps a copy of it for saving.
struct Inspector {
    logger: LogObserver,
    recorder: BinRecorder,
}

impl Inspector {
    fn new() -> Self {
        Self {
            logger: LogObserver::new(log::Level::Info),
            recorder: BinRecorder::new(),
        }
    }
}

impl BinObserver for Inspector {
    fn observe(&mut self, summary: &BinSummary<'_>) {
        self.logger.observe(summary);
        self.recorder.observe(summary);
    }
}

fn read_msgpack<T: DeserializeOwned>(file: &Path) -> Result<T> {
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let value = decode::from_read(&mut reader).context("failed to deserialize value")?;
    Ok(value)
}

fn write_msgpack<T: Serialize>(file: &Path, value: &T) -> Result<()> {
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write_named(&mut writer, value).context("failed to serialize value")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
