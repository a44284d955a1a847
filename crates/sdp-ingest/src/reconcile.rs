//! Schema-version reconciliation
//!
//! Two jobs: remap source-native field keys to canonical metric names
//! (with signed accumulation for split fields), and merge sub-period
//! records of the same source describing one (year, region).

use crate::config::schema::{field_rules, split_drop_metrics, SchemaVersion};
use sdp_common::CanonicalRecord;
use std::collections::BTreeMap;

/// Remap one batch of records extracted under a single schema version
///
/// Versions without field rules pass through unchanged; their extractor
/// already emits canonical metric names. Metrics whose definition does not
/// survive the mid-year transition are dropped here, before any merge.
pub fn remap(records: Vec<CanonicalRecord>, version: SchemaVersion) -> Vec<CanonicalRecord> {
    let dropped = split_drop_metrics(version);
    let mut out = match field_rules(version) {
        None => records,
        Some(rules) => records
            .into_iter()
            .map(|record| {
                let mut mapped = CanonicalRecord::new(record.year, record.region.clone());
                for rule in rules {
                    if let Some(value) = record.get(rule.source) {
                        mapped.add(rule.metric, if rule.negate { -value } else { value });
                    }
                }
                mapped
            })
            .collect(),
    };
    if !dropped.is_empty() {
        for record in &mut out {
            for metric in dropped {
                record.metrics.remove(*metric);
            }
        }
    }
    out
}

/// Merge records sharing a (year, region) by summing numeric metrics
///
/// Identity fields come from the grouping key and are never summed. For
/// non-transition years every key is unique and this is the identity.
pub fn merge_periods(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    let mut merged: BTreeMap<(i32, String), CanonicalRecord> = BTreeMap::new();
    for record in records {
        let key = (record.year, record.region.clone());
        merged
            .entry(key)
            .and_modify(|existing| existing.absorb(&record))
            .or_insert(record);
    }
    merged.into_values().collect()
}

/// Remap every batch under its schema version, then merge sub-periods
pub fn reconcile(batches: Vec<(SchemaVersion, Vec<CanonicalRecord>)>) -> Vec<CanonicalRecord> {
    let mut all = Vec::new();
    for (version, records) in batches {
        all.extend(remap(records, version));
    }
    merge_periods(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, region: &str, metrics: &[(&str, i64)]) -> CanonicalRecord {
        let mut r = CanonicalRecord::new(year, region);
        for (metric, value) in metrics {
            r.set(*metric, *value);
        }
        r
    }

    #[test]
    fn test_remap_renames_fields() {
        let records = vec![record(
            2013,
            "TW-TNN",
            &[("in_shelter_total", 900), ("adopted_out", 210)],
        )];
        let out = remap(records, SchemaVersion::V2012);
        assert_eq!(out[0].get("accept"), Some(900));
        assert_eq!(out[0].get("adopt"), Some(210));
        assert_eq!(out[0].get("in_shelter_total"), None);
    }

    #[test]
    fn test_remap_signed_accumulation() {
        // net intake subtracts the sterilized-and-released sub-field
        let records = vec![record(
            2015,
            "TW-CHA",
            &[("accept_gross", 500), ("tnvr_at_intake", 120)],
        )];
        let out = remap(records, SchemaVersion::V2015H2);
        assert_eq!(out[0].get("accept"), Some(380));
        assert_eq!(out[0].get("tnvr"), Some(120));
    }

    #[test]
    fn test_remap_drops_snapshot_from_first_half() {
        let records = vec![record(
            2015,
            "TW-CHA",
            &[("in_shelter_total", 300), ("year_end_count", 250)],
        )];
        let out = remap(records, SchemaVersion::V2015H1);
        assert_eq!(out[0].get("accept"), Some(300));
        assert_eq!(out[0].get("year_end"), None);
    }

    #[test]
    fn test_transition_year_merge() {
        // first half: no snapshot survives; second half: carries it
        let first = remap(
            vec![record(
                2015,
                "TW-ILA",
                &[
                    ("in_shelter_total", 300),
                    ("adopted_out", 80),
                    ("year_end_count", 260),
                ],
            )],
            SchemaVersion::V2015H1,
        );
        let second = remap(
            vec![record(
                2015,
                "TW-ILA",
                &[
                    ("accept_gross", 220),
                    ("tnvr_at_intake", 20),
                    ("adopted_out", 70),
                    ("year_end_count", 190),
                ],
            )],
            SchemaVersion::V2015H2,
        );

        let mut all = first;
        all.extend(second);
        let merged = merge_periods(all);
        assert_eq!(merged.len(), 1);
        let year_record = &merged[0];
        // overlapping numeric fields summed across both halves
        assert_eq!(year_record.get("accept"), Some(300 + 200));
        assert_eq!(year_record.get("adopt"), Some(150));
        // the snapshot comes only from the later half, never summed
        assert_eq!(year_record.get("year_end"), Some(190));
        assert_eq!(year_record.year, 2015);
        assert_eq!(year_record.region, "TW-ILA");
    }

    #[test]
    fn test_merge_keeps_distinct_keys_apart() {
        let merged = merge_periods(vec![
            record(2014, "TW-TPE", &[("accept", 1)]),
            record(2015, "TW-TPE", &[("accept", 2)]),
            record(2014, "TW-NWT", &[("accept", 3)]),
        ]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_passthrough_versions_unchanged() {
        let records = vec![record(2017, "TW-TPE", &[("abandon:0", 61)])];
        let out = remap(records.clone(), SchemaVersion::E2017);
        assert_eq!(out, records);
    }
}
