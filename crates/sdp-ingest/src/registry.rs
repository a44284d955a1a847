//! Source registry
//!
//! The static catalog of every release the pipeline ingests: where it
//! comes from, what format it arrives in, and which extractor handles it.
//! Registry order is execution order.

use crate::config::schema::SchemaVersion;
use sdp_common::types::PayloadFormat;

/// Where a source's payload comes from
#[derive(Debug, Clone, Copy)]
pub enum FetchLocation {
    /// Fetched over HTTP
    Url(&'static str),
    /// Supplied by hand under the raw-payload directory
    Manual(&'static str),
}

/// One sheet of a tabular source
#[derive(Debug, Clone, Copy)]
pub struct SheetSpec {
    /// Sheet name inside the workbook (ignored for CSV)
    pub sheet: &'static str,
    /// Reporting year, `None` when the layout designates a year column
    pub year: Option<i32>,
    pub version: SchemaVersion,
}

/// Extractor binding for a source
#[derive(Debug, Clone, Copy)]
pub enum ExtractorKind {
    /// JSON payload through a registered declarative transform
    Declarative { script: &'static str },
    /// Spreadsheet/CSV grid through header-driven column mapping
    Tabular { sheets: &'static [SheetSpec] },
    /// PDF page-table grids through the paginated-table extractor
    Paginated { year: i32, version: SchemaVersion },
}

/// A registered data source, immutable for the process lifetime
#[derive(Debug, Clone, Copy)]
pub struct SourceDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub location: FetchLocation,
    pub format: PayloadFormat,
    pub extractor: ExtractorKind,
    /// Upstream documentation page
    pub doc_url: &'static str,
}

static WORKBOOK_SHEETS: &[SheetSpec] = &[
    SheetSpec { sheet: "101年", year: Some(2012), version: SchemaVersion::V2012 },
    SheetSpec { sheet: "102年", year: Some(2013), version: SchemaVersion::V2012 },
    SheetSpec { sheet: "103年", year: Some(2014), version: SchemaVersion::V2012 },
    // 2015 split mid-year across the schema transition
    SheetSpec { sheet: "104年1-6月", year: Some(2015), version: SchemaVersion::V2015H1 },
    SheetSpec { sheet: "104年7-12月", year: Some(2015), version: SchemaVersion::V2015H2 },
];

static REGISTRY_SHEETS: &[SheetSpec] = &[SheetSpec {
    sheet: "",
    year: None,
    version: SchemaVersion::Registry,
}];

/// Every source, in execution order
pub static SOURCES: &[SourceDescriptor] = &[
    SourceDescriptor {
        id: "shelter_api",
        title: "公立動物收容所收容處理情形統計 (年度)",
        location: FetchLocation::Url(
            "https://data.moa.gov.tw/Service/OpenData/TransService.aspx?UnitId=DyplMIk3U1hf",
        ),
        format: PayloadFormat::Json,
        extractor: ExtractorKind::Declarative { script: "shelter_api" },
        doc_url: "https://data.gov.tw/dataset/41771",
    },
    SourceDescriptor {
        id: "shelter_workbook",
        title: "動物收容統計年報彙整表 (101–104年)",
        location: FetchLocation::Manual("shelter_workbook.xlsx"),
        format: PayloadFormat::Spreadsheet,
        extractor: ExtractorKind::Tabular { sheets: WORKBOOK_SHEETS },
        doc_url: "https://animal.moa.gov.tw/Frontend/Know/Report",
    },
    SourceDescriptor {
        id: "enforcement_2016",
        title: "動物保護法稽查裁罰統計 105年",
        location: FetchLocation::Manual("enforcement_105.json"),
        format: PayloadFormat::Pdf,
        extractor: ExtractorKind::Paginated { year: 2016, version: SchemaVersion::E2016 },
        doc_url: "https://animal.moa.gov.tw/Frontend/Know/Report",
    },
    SourceDescriptor {
        id: "enforcement_2017",
        title: "動物保護法稽查裁罰統計 106年",
        location: FetchLocation::Manual("enforcement_106.json"),
        format: PayloadFormat::Pdf,
        extractor: ExtractorKind::Paginated { year: 2017, version: SchemaVersion::E2017 },
        doc_url: "https://animal.moa.gov.tw/Frontend/Know/Report",
    },
    SourceDescriptor {
        id: "enforcement_2018",
        title: "動物保護法稽查裁罰統計 107年",
        location: FetchLocation::Manual("enforcement_107.json"),
        format: PayloadFormat::Pdf,
        extractor: ExtractorKind::Paginated { year: 2018, version: SchemaVersion::E2017 },
        doc_url: "https://animal.moa.gov.tw/Frontend/Know/Report",
    },
    SourceDescriptor {
        id: "pet_registry",
        title: "全國寵物登記與絕育統計",
        location: FetchLocation::Manual("pet_registry.csv"),
        format: PayloadFormat::Csv,
        extractor: ExtractorKind::Tabular { sheets: REGISTRY_SHEETS },
        doc_url: "https://www.pet.gov.tw/Web/O302.aspx",
    },
];

/// Look up a source by id
pub fn find(id: &str) -> Option<&'static SourceDescriptor> {
    SOURCES.iter().find(|s| s.id == id)
}
