//! Declarative-transform extractor
//!
//! JSON payloads run through a registered transform script; the projected
//! objects are accepted as canonical records without reconciliation.

use crate::transform::{eval, scripts};
use sdp_common::{CanonicalRecord, PipelineError, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Extract canonical records from a raw JSON payload
pub fn extract(source_id: &str, raw: &str, script_name: &str) -> Result<Vec<CanonicalRecord>> {
    let payload: Value = serde_json::from_str(raw)
        .map_err(|e| PipelineError::malformed(source_id, "json", e.to_string()))?;

    let transform = scripts::script(script_name)?;
    let projected = eval::apply(transform, &payload)?;

    let mut records = Vec::with_capacity(projected.len());
    for value in &projected {
        if let Some(record) = record_from_value(source_id, value)? {
            records.push(record);
        }
    }
    debug!(
        source = source_id,
        records = records.len(),
        "declarative extraction complete"
    );
    Ok(records)
}

/// Convert one projected object into a record
///
/// A null region marks a subtotal row the script could not filter by name;
/// those are dropped. A missing or non-integer year is malformed; the
/// script is expected to have converted it already.
fn record_from_value(source_id: &str, value: &Value) -> Result<Option<CanonicalRecord>> {
    let Some(obj) = value.as_object() else {
        return Err(PipelineError::malformed(
            source_id,
            "json",
            format!("transform produced a non-object: {value}"),
        ));
    };

    let region = match obj.get("region") {
        Some(Value::String(code)) => code.clone(),
        Some(Value::Null) | None => {
            debug!(source = source_id, "dropping record with unresolved region");
            return Ok(None);
        },
        Some(other) => {
            return Err(PipelineError::malformed(
                source_id,
                "json",
                format!("region must be a string, got {other}"),
            ))
        },
    };

    let year = obj
        .get("year")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            PipelineError::malformed(source_id, "json", "record has no integer year")
        })?;

    let mut record = CanonicalRecord::new(year as i32, region);
    for (key, value) in obj {
        if key == "year" || key == "region" {
            continue;
        }
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(v) => record.set(key.clone(), v),
                None => warn!(source = source_id, metric = %key, "non-integer metric dropped"),
            },
            // absent metrics stay absent; sparse records are the norm
            Value::Null => {},
            other => {
                warn!(source = source_id, metric = %key, value = %other, "non-numeric metric dropped")
            },
        }
    }
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_shelter_api_payload() {
        let raw = r#"[
            {"rpt_year": "107", "rpt_country": "臺中市",
             "accept_num": "3725", "adopt_num": "2233", "return_num": "402",
             "humane_num": "12", "dead_num": "156", "end_num": "1024"},
            {"rpt_year": "107", "rpt_country": "澎湖縣",
             "accept_num": "88", "adopt_num": "41"}
        ]"#;
        let records = extract("shelter_api", raw, "shelter_api").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 2018);
        assert_eq!(records[0].region, "TW-TXG");
        assert_eq!(records[0].get("accept"), Some(3725));
        // fields the row never carried stay absent
        assert_eq!(records[1].get("return"), None);
    }

    #[test]
    fn test_malformed_json_payload() {
        let err = extract("shelter_api", "{not json", "shelter_api").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedPayload { .. }));
    }

    #[test]
    fn test_missing_script() {
        let err = extract("shelter_api", "[]", "no_such_script").unwrap_err();
        assert!(matches!(err, PipelineError::MissingTransformScript(_)));
    }

    #[test]
    fn test_unknown_region_row_dropped() {
        let raw = r#"[{"rpt_year": "107", "rpt_country": "外島小計", "accept_num": "5"}]"#;
        let records = extract("shelter_api", raw, "shelter_api").unwrap();
        assert!(records.is_empty());
    }
}
