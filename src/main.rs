mod config;
mod manager;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Merge sampled series and resample them onto uniform bins.
#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Directory holding `config.toml` and the `dataset-*.msgpack` files.
    #[arg(long)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge all datasets into `merged.msgpack`, sorted by x.
    Merge,

    /// Bin-average `merged.msgpack` into `resampled.msgpack`.
    Resample {
        /// Log the bin table and save it to `bins.msgpack`.
        #[arg(long)]
        debug: bool,
    },

    /// Remove the generated files.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.data_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Merge => mgr.merge_datasets()?,
        Command::Resample { debug } => mgr.resample_merged(debug)?,
        Command::Clean => mgr.clean_outputs()?,
    }

    Ok(())
}
