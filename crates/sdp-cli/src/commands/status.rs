//! `sdp status` command implementation
//!
//! Shows per-source ledger and staleness state.

use anyhow::Result;
use colored::Colorize;
use sdp_ingest::ledger::{HashLedger, SourceMetadata};
use sdp_ingest::output;
use sdp_ingest::pipeline::DataPaths;
use sdp_ingest::registry;

/// Show ledger and metadata state for every registered source
pub fn run(paths: &DataPaths) -> Result<()> {
    let ledger = HashLedger::load(paths.ledger_path())?;
    let meta = SourceMetadata::load(paths.meta_path())?;

    if ledger.hashes.is_empty() && meta.checked_at.is_empty() {
        println!("No sources have been ingested yet.");
        println!("Run 'sdp run' to fetch and normalize the registered sources.");
        return Ok(());
    }

    println!("{}", "Registered sources:".cyan().bold());
    println!();

    for source in registry::SOURCES {
        println!("{}  {}", source.id.green().bold(), source.title);
        match ledger.hashes.get(source.id) {
            Some(hash) => println!("  Hash:     {}", &hash[..16.min(hash.len())]),
            None => println!("  Hash:     {}", "never ingested".yellow()),
        }
        if let Some(checked) = meta.checked_at.get(source.id) {
            println!("  Checked:  {checked}");
        }
        if let Some(updated) = meta.updated_at.get(source.id) {
            println!("  Updated:  {updated}");
        }
        let canonical = output::canonical_path(&paths.canonical_dir(), source.id);
        if canonical.exists() {
            let records = output::read_records(&canonical).map(|r| r.len()).unwrap_or(0);
            println!("  Records:  {records}");
        }
        println!();
    }

    match meta.built_at {
        Some(built) => println!("Combined dataset built at {built}"),
        None => println!("Combined dataset has not been built."),
    }
    Ok(())
}
