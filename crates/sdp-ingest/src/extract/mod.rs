//! Format-specific table extraction
//!
//! Three extractors share one contract (raw payload in, canonical records
//! out) with different parsing strategies: a declarative JSON transform,
//! header-driven spreadsheet/CSV column mapping, and the paginated PDF
//! table walker with its row-repair heuristics.

pub mod declarative;
pub mod grid;
pub mod paginated;
pub mod tabular;
