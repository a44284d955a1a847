//! Anchor-sample validation
//!
//! The publication gate: every hand-verified anchor sample must match the
//! normalized records exactly, or the source's previous canonical file
//! stays authoritative.

use crate::config::anchors::AnchorSample;
use sdp_common::{CanonicalRecord, PipelineError, Result};
use tracing::error;

/// Check every anchor sample against the records
///
/// On mismatch, the error report carries a structural diff against the
/// record sharing the anchor's (year, region), or states that none does.
pub fn validate(
    source_id: &str,
    records: &[CanonicalRecord],
    anchors: &[AnchorSample],
) -> Result<()> {
    let mut failures = Vec::new();

    for anchor in anchors {
        match records
            .iter()
            .find(|r| r.year == anchor.year && r.region == anchor.region)
        {
            None => failures.push(format!(
                "({}, {}): no record with this year and region",
                anchor.year, anchor.region
            )),
            Some(closest) => {
                let diffs = diff_against(closest, anchor);
                if !diffs.is_empty() {
                    failures.push(format!(
                        "({}, {}):\n{}",
                        anchor.year,
                        anchor.region,
                        diffs.join("\n")
                    ));
                }
            },
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    let report = failures.join("\n");
    error!(source = source_id, %report, "anchor validation failed");
    Err(PipelineError::ValidationFailed {
        source_id: source_id.to_string(),
        report,
    })
}

fn diff_against(record: &CanonicalRecord, anchor: &AnchorSample) -> Vec<String> {
    let mut diffs = Vec::new();
    for (metric, expected) in anchor.expect {
        match record.get(metric) {
            Some(actual) if actual == *expected => {},
            Some(actual) => {
                diffs.push(format!("  {metric}: expected {expected}, got {actual}"))
            },
            None => diffs.push(format!("  {metric}: expected {expected}, absent")),
        }
    }
    diffs
}
