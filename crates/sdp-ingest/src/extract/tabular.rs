//! Tabular extractor
//!
//! Header-driven extraction for spreadsheet sheets and CSV exports. The
//! first grid row is a title row and skipped; the second carries headers.
//! Header wording drifts across years, so resolution runs exact match →
//! prefix match (line breaks and stray whitespace corrupt header cells) →
//! the year-specific alias table.

use crate::config::regions::{self, EXPECTED_REGION_COUNT, REGIONS};
use crate::config::schema::{sheet_layout, KNOWN_MISSING};
use crate::extract::grid::Grid;
use crate::registry::SheetSpec;
use sdp_common::{CanonicalRecord, PipelineError, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Extract canonical-shaped records (source-native field keys) from a grid
pub fn extract(source_id: &str, grid: &Grid, spec: &SheetSpec) -> Result<Vec<CanonicalRecord>> {
    let layout = sheet_layout(spec.version).ok_or_else(|| {
        PipelineError::Config(format!(
            "schema version {:?} has no sheet layout",
            spec.version
        ))
    })?;

    if grid.len() < 3 {
        return Err(PipelineError::malformed(
            source_id,
            "spreadsheet",
            format!("sheet '{}' has no data rows", spec.sheet),
        ));
    }
    // row 0 is the sheet title
    let headers = &grid[1];

    let region_col = resolve_header(headers, layout.region_header, spec.year, &[])
        .ok_or_else(|| {
            PipelineError::malformed(
                source_id,
                "spreadsheet",
                format!(
                    "sheet '{}': region column '{}' not found",
                    spec.sheet, layout.region_header
                ),
            )
        })?;

    let year_col = match layout.year_header {
        Some(header) => Some(
            resolve_header(headers, header, spec.year, &[]).ok_or_else(|| {
                PipelineError::malformed(
                    source_id,
                    "spreadsheet",
                    format!("sheet '{}': year column '{header}' not found", spec.sheet),
                )
            })?,
        ),
        None => None,
    };

    let columns: Vec<(&str, Option<usize>)> = layout
        .fields
        .iter()
        .map(|f| {
            (
                f.key,
                resolve_header(headers, f.header, spec.year, f.aliases),
            )
        })
        .collect();

    let mut records = Vec::new();
    for (row_no, row) in grid.iter().enumerate().skip(2) {
        let Some(region_cell) = row.get(region_col) else {
            continue;
        };
        let Some(region) = regions::resolve(region_cell) else {
            // subtotal and footer rows have no resolvable region code
            debug!(source = source_id, row = row_no, cell = %region_cell, "dropping row without region code");
            continue;
        };

        let year = match year_col {
            Some(col) => {
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                match parse_year(cell) {
                    Some(year) => year,
                    None => {
                        return Err(PipelineError::malformed(
                            source_id,
                            "spreadsheet",
                            format!("row {row_no}: unparseable year cell '{cell}'"),
                        ))
                    },
                }
            },
            None => spec.year.ok_or_else(|| {
                PipelineError::Config(format!(
                    "sheet '{}' has neither a fixed year nor a year column",
                    spec.sheet
                ))
            })?,
        };

        let mut record = CanonicalRecord::new(year, region);
        for (key, col) in &columns {
            if let Some(col) = col {
                if let Some(value) = row.get(*col).and_then(|cell| parse_count(cell)) {
                    record.set(*key, value);
                }
            }
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(PipelineError::malformed(
            source_id,
            "spreadsheet",
            format!("sheet '{}' produced no region records", spec.sheet),
        ));
    }
    check_region_coverage(source_id, &records)?;
    check_field_coverage(source_id, layout.fields.iter().map(|f| f.key), &records)?;
    Ok(records)
}

/// Resolve a header to its column index
///
/// Whitespace is stripped from both sides of every comparison so headers
/// broken by embedded line feeds still match.
pub(crate) fn resolve_header(
    headers: &[String],
    wanted: &str,
    year: Option<i32>,
    aliases: &[(i32, &str)],
) -> Option<usize> {
    let wanted = squash(wanted);
    if let Some(col) = headers.iter().position(|h| squash(h) == wanted) {
        return Some(col);
    }
    if let Some(col) = headers.iter().position(|h| squash(h).starts_with(&wanted)) {
        return Some(col);
    }
    for (alias_year, alias) in aliases {
        if *alias_year == 0 || Some(*alias_year) == year {
            let alias = squash(alias);
            if let Some(col) = headers.iter().position(|h| squash(h) == alias) {
                return Some(col);
            }
        }
    }
    None
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parse a count cell, tolerating thousands separators; empty and
/// non-numeric cells are absent
fn parse_count(cell: &str) -> Option<i64> {
    let cleaned = squash(cell).replace([',', '，'], "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a year cell; Minguo years convert to Gregorian
fn parse_year(cell: &str) -> Option<i32> {
    let year: i32 = squash(cell).trim_end_matches('年').parse().ok()?;
    // four-digit values are already Gregorian (mixed exports exist)
    Some(if year < 1000 { year + 1911 } else { year })
}

/// National-level data must cover every region, each exactly once per year
fn check_region_coverage(source_id: &str, records: &[CanonicalRecord]) -> Result<()> {
    let mut by_year: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        by_year
            .entry(record.year)
            .or_default()
            .insert(record.region.as_str());
    }
    for (year, seen) in by_year {
        if seen.len() != EXPECTED_REGION_COUNT {
            let missing: Vec<&str> = REGIONS
                .iter()
                .map(|r| r.code)
                .filter(|code| !seen.contains(code))
                .collect();
            return Err(PipelineError::RegionCountMismatch {
                source_id: source_id.to_string(),
                year,
                expected: EXPECTED_REGION_COUNT,
                found: seen.len(),
                missing: missing.join(", "),
            });
        }
    }
    Ok(())
}

/// Every tracked field must appear at least once per year, minus the
/// known-missing exceptions for early years
fn check_field_coverage<'a>(
    source_id: &str,
    fields: impl Iterator<Item = &'a str> + Clone,
    records: &[CanonicalRecord],
) -> Result<()> {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    for year in years {
        for field in fields.clone() {
            let known_gap = KNOWN_MISSING.contains(&(year, field));
            let present = records
                .iter()
                .any(|r| r.year == year && r.get(field).is_some());
            if !present && !known_gap {
                return Err(PipelineError::MissingRequiredField {
                    source_id: source_id.to_string(),
                    year,
                    field: field.to_string(),
                });
            }
            if !present && known_gap {
                debug!(source = source_id, year, field, "known-missing field absent");
            }
        }
    }
    Ok(())
}
