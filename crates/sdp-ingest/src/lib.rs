//! shelterdata ingestion library
//!
//! Turns a decade of irregular animal-shelter and animal-protection
//! open-data releases (JSON API, spreadsheet exports, PDF report tables)
//! into one canonical, validated per-region per-year dataset.
//!
//! Pipeline stages, in registry order per source: content-hash change
//! detection → format-specific extraction → schema-version reconciliation →
//! anchor-sample validation → per-source canonical file. A final combine
//! step joins the per-source files into the wide dataset the reporting
//! front end consumes.
//!
//! # Example
//!
//! ```no_run
//! use sdp_ingest::pipeline::{self, DataPaths};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let paths = DataPaths::new("./data");
//!     let summary = pipeline::run_all(&paths, None, false).await?;
//!     println!("{} source(s) updated", summary.updated);
//!     Ok(())
//! }
//! ```

pub mod combine;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod registry;
pub mod transform;
pub mod validate;
