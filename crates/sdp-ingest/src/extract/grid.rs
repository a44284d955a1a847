//! Cell-grid loaders
//!
//! Every tabular-ish payload is reduced to a plain grid of cell strings
//! before extraction, so the extractors stay independent of the file
//! format (and of the PDF-extraction tooling, whose page tables arrive
//! here already captured as JSON grids).

use calamine::{Data, Reader, Xlsx};
use sdp_common::{PipelineError, Result};
use std::io::Cursor;

/// A 2-D array of cell strings
pub type Grid = Vec<Vec<String>>;

/// Parse a CSV payload into a grid
pub fn grid_from_csv(source_id: &str, text: &str) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Grid::new();
    for row in reader.records() {
        let record =
            row.map_err(|e| PipelineError::malformed(source_id, "csv", e.to_string()))?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// Read the named sheets of an xlsx workbook into grids, in order
pub fn grids_from_workbook(
    source_id: &str,
    payload: &[u8],
    sheets: &[&str],
) -> Result<Vec<Grid>> {
    let mut workbook = Xlsx::new(Cursor::new(payload.to_vec()))
        .map_err(|e| PipelineError::malformed(source_id, "spreadsheet", e.to_string()))?;

    let mut grids = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let range = workbook.worksheet_range(sheet).map_err(|e| {
            PipelineError::malformed(
                source_id,
                "spreadsheet",
                format!("sheet '{sheet}': {e}"),
            )
        })?;
        let grid = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        grids.push(grid);
    }
    Ok(grids)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Parse captured PDF page tables (a JSON array of page grids)
pub fn pages_from_json(source_id: &str, text: &str) -> Result<Vec<Grid>> {
    serde_json::from_str(text)
        .map_err(|e| PipelineError::malformed(source_id, "pdf", e.to_string()))
}
