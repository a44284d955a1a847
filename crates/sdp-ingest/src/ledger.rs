//! Hash ledger and source metadata
//!
//! Two small persisted documents: `ledger.json` maps source id → content
//! hash and gates re-extraction; `meta.json` carries the human-facing
//! staleness timestamps the front end reads. Both are loaded whole and
//! rewritten atomically.
//!
//! The ledger hash for a source is committed only after its canonical file
//! has been written successfully. A detected change followed by a failed
//! extraction therefore leaves the old hash in place and the next run
//! retries; `checked_at` still advances every run.

use crate::output;
use chrono::{DateTime, Utc};
use sdp_common::checksum::content_hash;
use sdp_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Outcome of a change check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Payload hash matches the stored one
    Unchanged,
    /// First sight, or the hash differs from the stored one
    Changed { hash: String },
}

/// Persisted source id → content hash mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashLedger {
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
}

impl HashLedger {
    /// Load the ledger, or an empty one if the file does not exist yet
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the ledger atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_json_atomic(path.as_ref(), self)
    }

    /// Hash `payload` and compare against the stored hash for `source_id`
    ///
    /// Pure with respect to the ledger: first sight and a differing hash
    /// both report `Changed`, and the caller commits the new hash once the
    /// downstream write has succeeded.
    pub fn check(&self, source_id: &str, payload: &[u8]) -> ChangeStatus {
        let hash = content_hash(payload);
        match self.hashes.get(source_id) {
            Some(stored) if *stored == hash => ChangeStatus::Unchanged,
            _ => ChangeStatus::Changed { hash },
        }
    }

    /// Store the hash for `source_id`
    pub fn commit(&mut self, source_id: &str, hash: String) {
        self.hashes.insert(source_id.to_string(), hash);
    }
}

/// Persisted staleness timestamps for the consuming front end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// When each source was last checked for changes, successful or not
    #[serde(default)]
    pub checked_at: BTreeMap<String, DateTime<Utc>>,
    /// When each source's canonical output last changed
    #[serde(default)]
    pub updated_at: BTreeMap<String, DateTime<Utc>>,
    /// When the combined dataset was last built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_at: Option<DateTime<Utc>>,
}

impl SourceMetadata {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_json_atomic(path.as_ref(), self)
    }

    pub fn mark_checked(&mut self, source_id: &str) {
        self.checked_at.insert(source_id.to_string(), Utc::now());
    }

    pub fn mark_updated(&mut self, source_id: &str) {
        self.updated_at.insert(source_id.to_string(), Utc::now());
    }

    pub fn mark_built(&mut self) {
        self.built_at = Some(Utc::now());
    }
}
