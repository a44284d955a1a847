//! sdp - shelterdata pipeline CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use sdp_cli::commands;
use sdp_common::logging::{init_logging, LogConfig, LogLevel};
use sdp_ingest::pipeline::DataPaths;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sdp")]
#[command(author, version, about = "shelterdata ingestion pipeline")]
struct Cli {
    /// Pipeline data directory
    #[arg(long, default_value = "./data", env = "SDP_DATA_DIR", global = true)]
    data_dir: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and normalize registered sources
    Run {
        /// Process a single source id instead of the whole registry
        #[arg(long)]
        source: Option<String>,

        /// Re-extract even when the payload hash is unchanged
        #[arg(long)]
        force: bool,
    },

    /// Join per-source canonical files into the combined dataset
    Combine,

    /// Copy the combined dataset into the static-serving directory
    Publish {
        /// Static-serving target directory
        #[arg(long, default_value = "./public/data", env = "SDP_PUBLIC_DIR")]
        public_dir: PathBuf,
    },

    /// Show ledger and staleness state per source
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::with_level(log_level).merge_env()?;
    init_logging(&log_config)?;

    let paths = DataPaths::new(&cli.data_dir);

    match cli.command {
        Command::Run { source, force } => {
            let clean = commands::run::run(&paths, source.as_deref(), force).await?;
            if !clean {
                std::process::exit(1);
            }
        },
        Command::Combine => commands::combine::run(&paths)?,
        Command::Publish { public_dir } => commands::publish::run(&paths, &public_dir)?,
        Command::Status => commands::status::run(&paths)?,
    }

    Ok(())
}
