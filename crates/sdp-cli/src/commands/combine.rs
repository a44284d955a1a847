//! `sdp combine` command implementation

use anyhow::Result;
use colored::Colorize;
use sdp_ingest::pipeline::{self, DataPaths};

/// Join the per-source canonical files into the combined dataset
pub fn run(paths: &DataPaths) -> Result<()> {
    let records = pipeline::run_combine(paths)?;
    println!(
        "{} {} wide record(s) -> {}",
        "Combined".green().bold(),
        records,
        paths.combined_path().display()
    );
    Ok(())
}
