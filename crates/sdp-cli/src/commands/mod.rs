//! Subcommand implementations
//!
//! Each module exposes a `run` function; the binary only parses arguments
//! and dispatches here.

pub mod combine;
pub mod publish;
pub mod run;
pub mod status;
