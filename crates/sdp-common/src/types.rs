//! Core types shared across pipeline stages

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload format of a registered source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    Json,
    Spreadsheet,
    Pdf,
    Csv,
}

impl PayloadFormat {
    pub fn as_str(&self) -> &str {
        match self {
            PayloadFormat::Json => "json",
            PayloadFormat::Spreadsheet => "spreadsheet",
            PayloadFormat::Pdf => "pdf",
            PayloadFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized per-(year, region) record
///
/// The metric map is sparse: a metric a source never reported is simply
/// absent, not zero. Serializes flat, so a record reads as
/// `{"year": 2018, "region": "TW-TXG", "accept": 3725, ...}`.
///
/// Records for the same (year, region) from *different* sources are never
/// merged into one `CanonicalRecord`; only the reconciler merges sub-period
/// records of a single source, and the combiner builds wide per-key records
/// without touching the per-source files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Gregorian calendar year
    pub year: i32,
    /// Stable region code (ISO 3166-2 style), never a display name
    pub region: String,
    /// Sparse metric name → count mapping
    #[serde(flatten)]
    pub metrics: BTreeMap<String, i64>,
}

impl CanonicalRecord {
    pub fn new(year: i32, region: impl Into<String>) -> Self {
        Self {
            year,
            region: region.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn get(&self, metric: &str) -> Option<i64> {
        self.metrics.get(metric).copied()
    }

    pub fn set(&mut self, metric: impl Into<String>, value: i64) {
        self.metrics.insert(metric.into(), value);
    }

    /// Add `value` to the metric, treating an absent metric as zero
    pub fn add(&mut self, metric: impl Into<String>, value: i64) {
        *self.metrics.entry(metric.into()).or_insert(0) += value;
    }

    /// Sum every metric of `other` into this record
    ///
    /// Identity fields are untouched; callers group by (year, region)
    /// before merging.
    pub fn absorb(&mut self, other: &CanonicalRecord) {
        for (metric, value) in &other.metrics {
            self.add(metric.clone(), *value);
        }
    }

    /// True when no metric survived extraction for this (year, region)
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
