//! `sdp run` command implementation
//!
//! Fetches and normalizes every registered source (or one with
//! `--source`), then prints a per-source summary.

use anyhow::Result;
use colored::Colorize;
use sdp_ingest::pipeline::{self, DataPaths};

/// Run the ingestion batch; returns false when the run is unrecoverable
pub async fn run(paths: &DataPaths, source: Option<&str>, force: bool) -> Result<bool> {
    let summary = pipeline::run_all(paths, source, force).await?;

    println!("{}", "Ingestion summary:".cyan().bold());
    println!("  Updated:   {}", summary.updated);
    println!("  Unchanged: {}", summary.unchanged);

    if !summary.failures.is_empty() {
        println!("  {}", format!("Failed:    {}", summary.failures.len()).red());
        for (source_id, message) in &summary.failures {
            println!("    {} {}", source_id.red().bold(), message);
        }
    }

    Ok(summary.fatal == 0)
}
