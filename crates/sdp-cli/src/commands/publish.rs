//! `sdp publish` command implementation

use anyhow::Result;
use colored::Colorize;
use sdp_ingest::pipeline::{self, DataPaths};
use std::path::Path;

/// Copy the combined dataset and metadata into the static-serving directory
pub fn run(paths: &DataPaths, public_dir: &Path) -> Result<()> {
    pipeline::run_publish(paths, public_dir)?;
    println!(
        "{} combined dataset to {}",
        "Published".green().bold(),
        public_dir.display()
    );
    Ok(())
}
