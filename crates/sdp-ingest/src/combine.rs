//! Multi-source combine step
//!
//! Joins the per-source canonical files into one wide record per
//! (year, region), fields from every input side by side. Fails fast when
//! an input file is missing, and aborts outright when an enforcement
//! dataset claims data beyond its upstream publication lag.

use crate::output;
use crate::transform::eval;
use crate::transform::scripts::{combine_inputs, JoinInput};
use sdp_common::{PipelineError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Combine the registered inputs from `canonical_dir` into wide records
pub fn combine(canonical_dir: &Path) -> Result<Vec<Value>> {
    combine_with(canonical_dir, combine_inputs())
}

/// Combine a specific input list (exposed for testing)
pub fn combine_with(canonical_dir: &Path, inputs: &[JoinInput]) -> Result<Vec<Value>> {
    // all inputs must exist before any work happens
    for input in inputs {
        let path = output::canonical_path(canonical_dir, input.dataset);
        if !path.exists() {
            return Err(PipelineError::MissingUpstreamFile(path));
        }
    }

    let mut wide: BTreeMap<(i32, String), Map<String, Value>> = BTreeMap::new();
    for input in inputs {
        let path = output::canonical_path(canonical_dir, input.dataset);
        let payload: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;

        let rows = match &input.transform {
            Some(transform) => eval::apply(transform, &payload)?,
            None => payload
                .as_array()
                .cloned()
                .ok_or_else(|| {
                    PipelineError::malformed(input.dataset, "json", "canonical file is not an array")
                })?,
        };
        debug!(dataset = input.dataset, rows = rows.len(), "joining dataset");

        for row in rows {
            let Some(obj) = row.as_object() else {
                return Err(PipelineError::malformed(
                    input.dataset,
                    "json",
                    format!("non-object record: {row}"),
                ));
            };
            let year = obj
                .get("year")
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    PipelineError::malformed(input.dataset, "json", "record has no integer year")
                })? as i32;
            let region = obj
                .get("region")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    PipelineError::malformed(input.dataset, "json", "record has no region")
                })?
                .to_string();

            if let Some(published_through) = input.embargo_after {
                if year > published_through {
                    return Err(PipelineError::EmbargoViolation {
                        source_id: input.dataset.to_string(),
                        year,
                        published_through,
                    });
                }
            }

            let entry = wide.entry((year, region.clone())).or_insert_with(|| {
                let mut base = Map::new();
                base.insert("year".to_string(), Value::from(year));
                base.insert("region".to_string(), Value::String(region));
                base
            });
            for (key, value) in obj {
                if key == "year" || key == "region" || value.is_null() {
                    continue;
                }
                entry.insert(key.clone(), value.clone());
            }
        }
    }

    let records: Vec<Value> = wide.into_values().map(Value::Object).collect();
    info!(records = records.len(), "combined dataset built");
    Ok(records)
}
