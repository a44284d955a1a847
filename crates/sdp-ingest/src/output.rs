//! Canonical output files
//!
//! Everything the pipeline persists goes through the atomic writer here:
//! write the full document to a sibling temp file, then rename over the
//! target, so an interrupted run never leaves a partial file behind.

use sdp_common::{CanonicalRecord, PipelineError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write a pretty-printed JSON document atomically
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "wrote");
    Ok(())
}

/// Path of a source's canonical file under the canonical directory
pub fn canonical_path(canonical_dir: &Path, source_id: &str) -> PathBuf {
    canonical_dir.join(format!("{source_id}.json"))
}

/// Read a per-source canonical file
pub fn read_records(path: &Path) -> Result<Vec<CanonicalRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Copy the combined dataset and metadata into the static-serving directory
pub fn publish(combined: &Path, meta: &Path, public_dir: &Path) -> Result<()> {
    for file in [combined, meta] {
        if !file.exists() {
            return Err(PipelineError::MissingUpstreamFile(file.to_path_buf()));
        }
    }
    std::fs::create_dir_all(public_dir)?;
    for file in [combined, meta] {
        let name = file
            .file_name()
            .ok_or_else(|| PipelineError::Config(format!("bad path: {}", file.display())))?;
        let target = public_dir.join(name);
        let mut tmp = target.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::copy(file, &tmp)?;
        std::fs::rename(&tmp, &target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("canonical.json");

        let mut record = CanonicalRecord::new(2018, "TW-TXG");
        record.set("accept", 3725);
        write_json_atomic(&path, &vec![record.clone()]).unwrap();

        // no temp file left behind
        assert!(!dir.path().join("canonical.json.tmp").exists());

        let records = read_records(&path).unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_write_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        write_json_atomic(&path, &vec![4]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains('4'));
        assert!(!content.contains('2'));
    }

    #[test]
    fn test_publish_requires_both_files() {
        let dir = TempDir::new().unwrap();
        let combined = dir.path().join("combined.json");
        let meta = dir.path().join("meta.json");
        std::fs::write(&combined, "[]").unwrap();

        let err = publish(&combined, &meta, &dir.path().join("public")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingUpstreamFile(p) if p == meta));
    }

    #[test]
    fn test_publish_copies_verbatim() {
        let dir = TempDir::new().unwrap();
        let combined = dir.path().join("combined.json");
        let meta = dir.path().join("meta.json");
        std::fs::write(&combined, "[{\"year\":2018}]").unwrap();
        std::fs::write(&meta, "{}").unwrap();

        let public = dir.path().join("public");
        publish(&combined, &meta, &public).unwrap();
        assert_eq!(
            std::fs::read_to_string(public.join("combined.json")).unwrap(),
            "[{\"year\":2018}]"
        );
        assert_eq!(std::fs::read_to_string(public.join("meta.json")).unwrap(), "{}");
    }
}
