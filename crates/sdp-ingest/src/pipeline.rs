//! Batch pipeline orchestration
//!
//! One source at a time, in registry order: fetch → hash check → extract →
//! reconcile → validate → persist. Failures are caught at the per-source
//! boundary so one broken source never blocks the rest of the batch. The
//! ledger hash is committed only after the canonical file write succeeds;
//! a failed run is retried next time because the old hash stays in place.

use crate::combine;
use crate::config::anchors::anchors_for;
use crate::extract::{declarative, grid, paginated, tabular};
use crate::fetch::{fetch_payload, payload_text};
use crate::ledger::{ChangeStatus, HashLedger, SourceMetadata};
use crate::output;
use crate::reconcile;
use crate::registry::{self, ExtractorKind, SourceDescriptor};
use crate::validate::validate;
use sdp_common::{CanonicalRecord, PipelineError, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Filesystem layout of the pipeline's data directory
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Manually supplied payloads live here
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    /// Per-source canonical output files
    pub fn canonical_dir(&self) -> PathBuf {
        self.data_dir.join("canonical")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger.json")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.data_dir.join("meta.json")
    }

    pub fn combined_path(&self) -> PathBuf {
        self.data_dir.join("combined.json")
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(self.raw_dir())?;
        std::fs::create_dir_all(self.canonical_dir())?;
        Ok(())
    }
}

/// Outcome of one source's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Payload hash matched the ledger; nothing rewritten
    Unchanged,
    /// Canonical file rewritten with this many records
    Updated { records: usize },
}

/// Result of a whole batch run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub updated: usize,
    pub unchanged: usize,
    /// (source id, error message) per failed source
    pub failures: Vec<(String, String)>,
    /// Unrecoverable failures: a validation failure, or any failure for a
    /// source with no prior canonical output
    pub fatal: usize,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every registered source (or just `only`), isolating failures
pub async fn run_all(paths: &DataPaths, only: Option<&str>, force: bool) -> Result<RunSummary> {
    paths.ensure_dirs()?;

    let sources: Vec<&'static SourceDescriptor> = match only {
        Some(id) => vec![registry::find(id).ok_or_else(|| {
            PipelineError::UnknownSource(id.to_string())
        })?],
        None => registry::SOURCES.iter().collect(),
    };

    let client = reqwest::Client::new();
    let mut ledger = HashLedger::load(paths.ledger_path())?;
    let mut meta = SourceMetadata::load(paths.meta_path())?;
    let mut summary = RunSummary::default();

    for source in sources {
        match run_source(paths, &client, &mut ledger, &mut meta, source, force).await {
            Ok(SourceOutcome::Unchanged) => {
                info!(source = source.id, "no change");
                summary.unchanged += 1;
            },
            Ok(SourceOutcome::Updated { records }) => {
                info!(source = source.id, records, "canonical output updated");
                summary.updated += 1;
            },
            Err(e) => {
                error!(source = source.id, error = %e, "source failed; continuing batch");
                let has_prior =
                    output::canonical_path(&paths.canonical_dir(), source.id).exists();
                if !has_prior || matches!(e, PipelineError::ValidationFailed { .. }) {
                    summary.fatal += 1;
                }
                summary.failures.push((source.id.to_string(), e.to_string()));
            },
        }
        // ledger and metadata are persisted per source, not per batch, so
        // an interrupted run keeps what it finished
        ledger.save(paths.ledger_path())?;
        meta.save(paths.meta_path())?;
    }

    Ok(summary)
}

/// Run one source's pipeline end to end
pub async fn run_source(
    paths: &DataPaths,
    client: &reqwest::Client,
    ledger: &mut HashLedger,
    meta: &mut SourceMetadata,
    source: &SourceDescriptor,
    force: bool,
) -> Result<SourceOutcome> {
    let payload = fetch_payload(client, source, &paths.raw_dir()).await?;
    meta.mark_checked(source.id);

    let hash = match ledger.check(source.id, &payload) {
        ChangeStatus::Unchanged if !force => return Ok(SourceOutcome::Unchanged),
        ChangeStatus::Unchanged => {
            warn!(source = source.id, "unchanged payload re-extracted (--force)");
            None
        },
        ChangeStatus::Changed { hash } => Some(hash),
    };

    let records = extract_records(source, &payload)?;
    validate(source.id, &records, anchors_for(source.id))?;

    let path = output::canonical_path(&paths.canonical_dir(), source.id);
    output::write_json_atomic(&path, &records)?;

    if let Some(hash) = hash {
        ledger.commit(source.id, hash);
    }
    meta.mark_updated(source.id);
    Ok(SourceOutcome::Updated {
        records: records.len(),
    })
}

/// Dispatch to the extractor registered for the source
fn extract_records(source: &SourceDescriptor, payload: &[u8]) -> Result<Vec<CanonicalRecord>> {
    match source.extractor {
        ExtractorKind::Declarative { script } => {
            let text = payload_text(source, payload)?;
            declarative::extract(source.id, &text, script)
        },
        ExtractorKind::Tabular { sheets } => {
            let grids = match source.format {
                sdp_common::PayloadFormat::Csv => {
                    let text = payload_text(source, payload)?;
                    vec![grid::grid_from_csv(source.id, &text)?]
                },
                _ => {
                    let names: Vec<&str> = sheets.iter().map(|s| s.sheet).collect();
                    grid::grids_from_workbook(source.id, payload, &names)?
                },
            };
            let mut batches = Vec::with_capacity(sheets.len());
            for (spec, sheet_grid) in sheets.iter().zip(&grids) {
                let records = tabular::extract(source.id, sheet_grid, spec)?;
                batches.push((spec.version, records));
            }
            Ok(reconcile::reconcile(batches))
        },
        ExtractorKind::Paginated { year, version } => {
            let text = payload_text(source, payload)?;
            let pages = grid::pages_from_json(source.id, &text)?;
            paginated::extract(source.id, &pages, version, year)
        },
    }
}

/// Build the combined dataset and stamp the build time
pub fn run_combine(paths: &DataPaths) -> Result<usize> {
    let records = combine::combine(&paths.canonical_dir())?;
    output::write_json_atomic(&paths.combined_path(), &records)?;

    let mut meta = SourceMetadata::load(paths.meta_path())?;
    meta.mark_built();
    meta.save(paths.meta_path())?;
    Ok(records.len())
}

/// Copy the combined dataset and metadata to the static-serving directory
pub fn run_publish(paths: &DataPaths, public_dir: &Path) -> Result<()> {
    output::publish(&paths.combined_path(), &paths.meta_path(), public_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_layout() {
        let paths = DataPaths::new("/srv/shelterdata");
        assert_eq!(paths.raw_dir(), PathBuf::from("/srv/shelterdata/raw"));
        assert_eq!(
            paths.canonical_dir(),
            PathBuf::from("/srv/shelterdata/canonical")
        );
        assert_eq!(
            paths.ledger_path(),
            PathBuf::from("/srv/shelterdata/ledger.json")
        );
    }

    #[tokio::test]
    async fn test_unknown_source_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let err = run_all(&paths, Some("no_such_source"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownSource(_)));
    }
}
