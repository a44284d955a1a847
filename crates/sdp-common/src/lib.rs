//! Shared types and utilities for the shelterdata pipeline
//!
//! This crate carries everything both the ingestion library and the CLI
//! need: the error taxonomy, content hashing for change detection, logging
//! setup, and the canonical record type all pipeline stages exchange.

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{PipelineError, Result};
pub use types::{CanonicalRecord, PayloadFormat};
