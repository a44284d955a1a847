//! Paginated-table extractor
//!
//! Walks enforcement-report page grids: resolves the region column blocks
//! from the header row, classifies body rows by their step label, repairs
//! category labels mangled by PDF text extraction, and sums values per
//! (region, category, step) across quarters and pages.

use crate::config::offences::{category_for_label, pdf_layout, step_flag, PdfLayout};
use crate::config::regions;
use crate::config::schema::SchemaVersion;
use crate::extract::grid::Grid;
use sdp_common::{CanonicalRecord, PipelineError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// A classified body row
struct BodyRow<'a> {
    /// Index within the page body (for error reporting)
    index: usize,
    /// Raw category cell
    label: &'a str,
    /// Recognized step flag, `None` for continuation and summary rows
    step: Option<u8>,
    cells: &'a [String],
}

/// Extract canonical records from a report's page grids
pub fn extract(
    source_id: &str,
    pages: &[Grid],
    version: SchemaVersion,
    year: i32,
) -> Result<Vec<CanonicalRecord>> {
    let layout = pdf_layout(version).ok_or_else(|| {
        PipelineError::Config(format!("schema version {version:?} has no PDF layout"))
    })?;

    if pages.is_empty() {
        return Err(PipelineError::UnexpectedHeaderShape {
            source_id: source_id.to_string(),
            page: 0,
            detail: "report has no pages".to_string(),
        });
    }

    let mut totals: BTreeMap<(&'static str, String), i64> = BTreeMap::new();
    for (page_no, page) in pages.iter().enumerate() {
        extract_page(source_id, page, page_no, layout, &mut totals)?;
    }

    let mut records: BTreeMap<&'static str, CanonicalRecord> = BTreeMap::new();
    for ((region, metric), value) in totals {
        records
            .entry(region)
            .or_insert_with(|| CanonicalRecord::new(year, region))
            .set(metric, value);
    }
    Ok(records.into_values().collect())
}

fn extract_page(
    source_id: &str,
    page: &Grid,
    page_no: usize,
    layout: &PdfLayout,
    totals: &mut BTreeMap<(&'static str, String), i64>,
) -> Result<()> {
    if page.len() <= layout.header_rows {
        return Err(PipelineError::UnexpectedHeaderShape {
            source_id: source_id.to_string(),
            page: page_no,
            detail: format!(
                "page has {} row(s), expected {} header row(s) plus a body",
                page.len(),
                layout.header_rows
            ),
        });
    }

    let col_region = resolve_region_columns(source_id, page, page_no, layout)?;

    let body: Vec<BodyRow> = page[layout.header_rows..]
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            let step_cell = cells.get(layout.step_col).map(String::as_str).unwrap_or("");
            let step = step_flag(step_cell);
            if step.is_none() && !step_cell.trim().is_empty() {
                // summary rows (小計/合計) carry an unrecognized step label
                debug!(source = source_id, page = page_no, row = index, cell = step_cell, "skipping row with unrecognized step");
            }
            BodyRow {
                index,
                label: cells.get(layout.category_col).map(String::as_str).unwrap_or(""),
                step,
                cells,
            }
        })
        .collect();

    for row in &body {
        let Some(step) = row.step else {
            // no step label: a pure label-continuation row
            continue;
        };
        let category = resolve_category(&body, row.index, step).ok_or_else(|| {
            PipelineError::UnresolvedCategory {
                source_id: source_id.to_string(),
                page: page_no,
                row: row.index,
                step,
            }
        })?;
        let metric = format!("{category}:{step}");

        for (col, cell) in row.cells.iter().enumerate() {
            let Some(region) = col_region.get(col).copied().flatten() else {
                continue;
            };
            // zero and non-numeric cells are absent, keeping records sparse
            if let Some(value) = parse_count(cell) {
                *totals.entry((region, metric.clone())).or_insert(0) += value;
            }
        }
    }
    Ok(())
}

/// Map every column index to the region owning its block
///
/// Scans the header rows left-to-right; a cell naming a known region opens
/// a block covering that column and the following ones, up to the layout's
/// columns-per-region. Anything past a full block (e.g. change-from-prior
/// columns) stays unassigned until the next region name.
fn resolve_region_columns(
    source_id: &str,
    page: &Grid,
    page_no: usize,
    layout: &PdfLayout,
) -> Result<Vec<Option<&'static str>>> {
    for header_row in &page[..layout.header_rows] {
        let mut mapping: Vec<Option<&'static str>> = vec![None; header_row.len()];
        let mut current: Option<&'static str> = None;
        let mut assigned = 0usize;

        for (col, cell) in header_row.iter().enumerate() {
            if let Some(code) = regions::resolve(cell) {
                current = Some(code);
                assigned = 0;
            }
            if let Some(code) = current {
                if assigned < layout.cols_per_region {
                    mapping[col] = Some(code);
                    assigned += 1;
                } else {
                    current = None;
                }
            }
        }

        if mapping.iter().any(Option::is_some) {
            return Ok(mapping);
        }
    }
    Err(PipelineError::UnexpectedHeaderShape {
        source_id: source_id.to_string(),
        page: page_no,
        detail: "no known region name in any header row".to_string(),
    })
}

/// Recover the category for a body row
///
/// The row's own label wins when it normalizes to a known category.
/// Otherwise the label was lost to a cross-row text wrap: reported rows
/// (step 0) print above their wrapped label, so scan forward; penalized
/// rows (step 1) sit below the labeled row of their pair, so scan
/// backward. Rows carrying the same step value are tried first; a labeled
/// neighbor with the other step (the usual reported/penalized pairing)
/// is the fallback.
fn resolve_category(rows: &[BodyRow<'_>], index: usize, step: u8) -> Option<&'static str> {
    if let Some(category) = category_for_label(rows[index].label) {
        return Some(category);
    }
    let scan = |same_step_only: bool| {
        let candidates: Box<dyn Iterator<Item = &BodyRow<'_>>> = if step == 0 {
            Box::new(rows[index + 1..].iter())
        } else {
            Box::new(rows[..index].iter().rev())
        };
        candidates
            .filter(|r| !same_step_only || r.step == Some(step))
            .find_map(|r| category_for_label(r.label))
    };
    scan(true).or_else(|| scan(false))
}

fn parse_count(cell: &str) -> Option<i64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '，')
        .collect();
    match cleaned.parse::<i64>() {
        Ok(0) | Err(_) => None,
        Ok(value) => Some(value),
    }
}
