//! Payload fetching
//!
//! HTTP sources are fetched with a shared [`reqwest::Client`]; manually
//! supplied sources are read from the raw-payload directory. There is no
//! retry or timeout policy beyond the client defaults: a failed fetch is
//! reported and the source is skipped for the run.

use crate::registry::{FetchLocation, SourceDescriptor};
use sdp_common::{PipelineError, Result};
use std::path::Path;
use tracing::debug;

/// Fetch the raw payload bytes for a source
pub async fn fetch_payload(
    client: &reqwest::Client,
    source: &SourceDescriptor,
    raw_dir: &Path,
) -> Result<Vec<u8>> {
    match source.location {
        FetchLocation::Url(url) => {
            debug!(source = source.id, url, "fetching payload");
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| PipelineError::network(source.id, e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(PipelineError::network(
                    source.id,
                    format!("HTTP {status} from {url}"),
                ));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| PipelineError::network(source.id, e.to_string()))?;
            Ok(bytes.to_vec())
        },
        FetchLocation::Manual(filename) => {
            let path = raw_dir.join(filename);
            debug!(source = source.id, path = %path.display(), "reading manual payload");
            if !path.exists() {
                return Err(PipelineError::MissingRawPayload {
                    source_id: source.id.to_string(),
                    path,
                });
            }
            Ok(std::fs::read(path)?)
        },
    }
}

/// Decode a textual payload, rejecting invalid UTF-8 loudly
pub fn payload_text(source: &SourceDescriptor, payload: &[u8]) -> Result<String> {
    String::from_utf8(payload.to_vec()).map_err(|e| {
        PipelineError::malformed(source.id, source.format.as_str(), e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ExtractorKind;
    use sdp_common::types::PayloadFormat;
    use tempfile::TempDir;

    fn manual_source(filename: &'static str) -> SourceDescriptor {
        SourceDescriptor {
            id: "manual_test",
            title: "manual test source",
            location: FetchLocation::Manual(filename),
            format: PayloadFormat::Csv,
            extractor: ExtractorKind::Tabular { sheets: &[] },
            doc_url: "",
        }
    }

    #[tokio::test]
    async fn test_manual_payload_read() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("export.csv"), b"a,b\n1,2\n").unwrap();

        let client = reqwest::Client::new();
        let payload = fetch_payload(&client, &manual_source("export.csv"), dir.path())
            .await
            .unwrap();
        assert_eq!(payload, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_missing_manual_payload() {
        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();
        let err = fetch_payload(&client, &manual_source("absent.csv"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingRawPayload { .. }));
    }

    #[test]
    fn test_payload_text_rejects_invalid_utf8() {
        let source = manual_source("x.csv");
        let err = payload_text(&source, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedPayload { .. }));
    }
}
