//! End-to-end pipeline tests over a temporary data directory

use sdp_common::types::PayloadFormat;
use sdp_common::PipelineError;
use sdp_ingest::config::schema::SchemaVersion;
use sdp_ingest::ledger::{HashLedger, SourceMetadata};
use sdp_ingest::output;
use sdp_ingest::pipeline::{self, DataPaths, SourceOutcome};
use sdp_ingest::registry::{ExtractorKind, FetchLocation, SheetSpec, SourceDescriptor};
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

static REGISTRY_SHEETS: &[SheetSpec] = &[SheetSpec {
    sheet: "",
    year: None,
    version: SchemaVersion::Registry,
}];

fn csv_source() -> SourceDescriptor {
    SourceDescriptor {
        id: "registry_export",
        title: "registry export fixture",
        location: FetchLocation::Manual("registry.csv"),
        format: PayloadFormat::Csv,
        extractor: ExtractorKind::Tabular {
            sheets: REGISTRY_SHEETS,
        },
        doc_url: "",
    }
}

/// Registry-shaped CSV covering all 22 regions for one Minguo year
fn registry_csv() -> String {
    let mut text = String::from("全國寵物登記統計,,,\n年度,縣市,犬隻登記數,犬隻絕育數\n");
    for region in sdp_ingest::config::regions::REGIONS {
        text.push_str(&format!("107,{},120,45\n", region.name));
    }
    text
}

async fn run_one(
    paths: &DataPaths,
    source: &SourceDescriptor,
    force: bool,
) -> sdp_common::Result<SourceOutcome> {
    paths.ensure_dirs().unwrap();
    let client = reqwest::Client::new();
    let mut ledger = HashLedger::load(paths.ledger_path()).unwrap();
    let mut meta = SourceMetadata::load(paths.meta_path()).unwrap();
    let outcome = pipeline::run_source(paths, &client, &mut ledger, &mut meta, source, force).await;
    ledger.save(paths.ledger_path()).unwrap();
    meta.save(paths.meta_path()).unwrap();
    outcome
}

#[tokio::test]
async fn manual_csv_source_end_to_end() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());
    paths.ensure_dirs().unwrap();
    std::fs::write(paths.raw_dir().join("registry.csv"), registry_csv()).unwrap();

    let source = csv_source();

    // first sight: extracted and written
    let outcome = run_one(&paths, &source, false).await.unwrap();
    assert_eq!(outcome, SourceOutcome::Updated { records: 22 });

    let records =
        output::read_records(&output::canonical_path(&paths.canonical_dir(), source.id)).unwrap();
    assert_eq!(records.len(), 22);
    let tainan = records.iter().find(|r| r.region == "TW-TNN").unwrap();
    assert_eq!(tainan.year, 2018);
    assert_eq!(tainan.get("dog_registered"), Some(120));
    assert_eq!(tainan.get("dog_neutered"), Some(45));

    let ledger = HashLedger::load(paths.ledger_path()).unwrap();
    assert!(ledger.hashes.contains_key("registry_export"));
    let meta = SourceMetadata::load(paths.meta_path()).unwrap();
    assert!(meta.checked_at.contains_key("registry_export"));
    assert!(meta.updated_at.contains_key("registry_export"));

    // unchanged payload: no rewrite
    let outcome = run_one(&paths, &source, false).await.unwrap();
    assert_eq!(outcome, SourceOutcome::Unchanged);

    // force overrides the unchanged hash
    let outcome = run_one(&paths, &source, true).await.unwrap();
    assert_eq!(outcome, SourceOutcome::Updated { records: 22 });

    // a changed payload re-triggers extraction
    let changed = registry_csv().replace("107,臺北市,120,45", "107,臺北市,121,45");
    std::fs::write(paths.raw_dir().join("registry.csv"), changed).unwrap();
    let outcome = run_one(&paths, &source, false).await.unwrap();
    assert_eq!(outcome, SourceOutcome::Updated { records: 22 });
    let records =
        output::read_records(&output::canonical_path(&paths.canonical_dir(), source.id)).unwrap();
    let taipei = records.iter().find(|r| r.region == "TW-TPE").unwrap();
    assert_eq!(taipei.get("dog_registered"), Some(121));
}

/// API fixture satisfying the shelter_api anchor samples
fn api_fixture() -> serde_json::Value {
    serde_json::json!([
        {"rpt_year": "107", "rpt_country": "臺中市",
         "accept_num": "3,725", "adopt_num": "2233", "return_num": "410",
         "humane_num": "0", "dead_num": "156", "end_num": "1024"},
        {"rpt_year": "106", "rpt_country": "臺北市",
         "accept_num": "2514", "adopt_num": "1902", "return_num": "388",
         "humane_num": "3", "dead_num": "99", "end_num": "377"},
        {"rpt_year": "107", "rpt_country": "全臺",
         "accept_num": "99999", "adopt_num": "88888"}
    ])
}

fn api_source(url: &str) -> SourceDescriptor {
    SourceDescriptor {
        id: "shelter_api",
        title: "shelter API fixture",
        location: FetchLocation::Url(Box::leak(url.to_string().into_boxed_str())),
        format: PayloadFormat::Json,
        extractor: ExtractorKind::Declarative {
            script: "shelter_api",
        },
        doc_url: "",
    }
}

#[tokio::test]
async fn http_json_source_passes_anchor_gate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_fixture()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());

    let source = api_source(&server.uri());
    let outcome = run_one(&paths, &source, false).await.unwrap();
    assert_eq!(outcome, SourceOutcome::Updated { records: 2 });

    let records =
        output::read_records(&output::canonical_path(&paths.canonical_dir(), "shelter_api"))
            .unwrap();
    let taichung = records.iter().find(|r| r.region == "TW-TXG").unwrap();
    assert_eq!(taichung.year, 2018);
    assert_eq!(taichung.get("accept"), Some(3725));
}

#[tokio::test]
async fn validation_failure_blocks_publish_and_retries() {
    let server = MockServer::start().await;
    let mut fixture = api_fixture();
    // a single wrong digit against the hand-verified anchor
    fixture[0]["accept_num"] = serde_json::json!("3726");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());

    let source = api_source(&server.uri());
    let err = run_one(&paths, &source, false).await.unwrap_err();
    assert!(matches!(err, PipelineError::ValidationFailed { .. }));

    // no canonical file was written
    assert!(!output::canonical_path(&paths.canonical_dir(), "shelter_api").exists());

    // the hash was not committed, so the next run retries extraction
    let ledger = HashLedger::load(paths.ledger_path()).unwrap();
    assert!(!ledger.hashes.contains_key("shelter_api"));
    let err = run_one(&paths, &source, false).await.unwrap_err();
    assert!(matches!(err, PipelineError::ValidationFailed { .. }));
}

#[tokio::test]
async fn network_failure_is_reported_not_crashed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());
    let source = api_source(&server.uri());
    let err = run_one(&paths, &source, false).await.unwrap_err();
    assert!(matches!(err, PipelineError::NetworkFailure { .. }));
}

#[test]
fn combine_and_publish_end_to_end() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());
    paths.ensure_dirs().unwrap();

    // every registered combine input must be present
    let mut shelter = sdp_common::CanonicalRecord::new(2017, "TW-TPE");
    shelter.set("accept", 2514);
    let mut enforcement = sdp_common::CanonicalRecord::new(2017, "TW-TPE");
    enforcement.set("abandon:0", 61);
    let mut registry = sdp_common::CanonicalRecord::new(2017, "TW-TPE");
    registry.set("dog_registered", 120);
    registry.set("dog_neutered", 45);

    let canonical = paths.canonical_dir();
    output::write_json_atomic(
        &output::canonical_path(&canonical, "shelter_workbook"),
        &vec![shelter.clone()],
    )
    .unwrap();
    output::write_json_atomic(
        &output::canonical_path(&canonical, "shelter_api"),
        &Vec::<sdp_common::CanonicalRecord>::new(),
    )
    .unwrap();
    for id in ["enforcement_2016", "enforcement_2017", "enforcement_2018"] {
        output::write_json_atomic(
            &output::canonical_path(&canonical, id),
            &vec![enforcement.clone()],
        )
        .unwrap();
    }
    output::write_json_atomic(
        &output::canonical_path(&canonical, "pet_registry"),
        &vec![registry],
    )
    .unwrap();

    let count = pipeline::run_combine(&paths).unwrap();
    assert_eq!(count, 1);

    let combined: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(paths.combined_path()).unwrap()).unwrap();
    let record = &combined[0];
    assert_eq!(record["region"], "TW-TPE");
    assert_eq!(record["accept"], 2514);
    assert_eq!(record["abandon:0"], 61);
    // pet-registry metrics arrive under their join-script names
    assert_eq!(record["registered"], 120);
    assert_eq!(record["neutered"], 45);

    let meta = SourceMetadata::load(paths.meta_path()).unwrap();
    assert!(meta.built_at.is_some());

    let public = dir.path().join("public");
    pipeline::run_publish(&paths, &public).unwrap();
    assert!(public.join("combined.json").exists());
    assert!(public.join("meta.json").exists());
}

#[test]
fn combine_fails_fast_on_missing_dataset() {
    let dir = TempDir::new().unwrap();
    let paths = DataPaths::new(dir.path());
    paths.ensure_dirs().unwrap();

    let err = pipeline::run_combine(&paths).unwrap_err();
    assert!(matches!(err, PipelineError::MissingUpstreamFile(_)));
}
