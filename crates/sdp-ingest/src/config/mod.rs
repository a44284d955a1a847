//! Static pipeline configuration
//!
//! Region lookup tables, schema-version field maps, enforcement report
//! layouts, and the anchor samples gating publication. Everything here is
//! immutable, compiled-in configuration; nothing is mutated at runtime.

pub mod anchors;
pub mod offences;
pub mod regions;
pub mod schema;
