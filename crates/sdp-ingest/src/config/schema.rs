//! Schema versions, sheet layouts, and field-mapping rules
//!
//! A schema version is selected by the source's publication period, never
//! by sniffing the payload. It fixes two things: the sheet layout the
//! tabular extractor expects (headers and their per-year aliases) and the
//! field-mapping rules the reconciler applies to the extracted records.

use serde::{Deserialize, Serialize};

/// Schema version identifier
///
/// Shelter statistics: `V2012` covers the 2012–2014 annual sheets,
/// `V2015H1`/`V2015H2` the two halves of the mid-2015 transition year,
/// `V2016` the JSON API era. `Registry` is the pet-registry CSV export.
/// `E2016`/`E2017` select enforcement-report table layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    V2012,
    V2015H1,
    V2015H2,
    V2016,
    Registry,
    E2016,
    E2017,
}

/// The calendar year split across two schema versions
pub const TRANSITION_YEAR: i32 = 2015;

/// Schema version for a shelter-statistics publication year
///
/// The transition-year halves are assigned per sheet by the registry, so
/// 2015 resolves to the later half here.
pub fn shelter_schema_for_year(year: i32) -> SchemaVersion {
    match year {
        ..=2014 => SchemaVersion::V2012,
        2015 => SchemaVersion::V2015H2,
        _ => SchemaVersion::V2016,
    }
}

/// Schema version for an enforcement-report publication year
pub fn enforcement_schema_for_year(year: i32) -> SchemaVersion {
    if year <= 2016 {
        SchemaVersion::E2016
    } else {
        SchemaVersion::E2017
    }
}

/// One expected column of a tabular sheet
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Source-native field key the extractor emits
    pub key: &'static str,
    /// Expected header text
    pub header: &'static str,
    /// Year-specific literal aliases for years whose wording changed
    pub aliases: &'static [(i32, &'static str)],
}

/// Expected shape of a tabular sheet
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    /// Header of the region-name column
    pub region_header: &'static str,
    /// Header of a Minguo-year column, for sheets spanning multiple years
    pub year_header: Option<&'static str>,
    /// Tracked data columns
    pub fields: &'static [ColumnSpec],
}

static SHELTER_2012_LAYOUT: SheetLayout = SheetLayout {
    region_header: "縣市別",
    year_header: None,
    fields: &[
        ColumnSpec {
            key: "in_shelter_total",
            header: "收容隻數",
            // 2013 reworded the intake column
            aliases: &[(2013, "收容動物隻數")],
        },
        ColumnSpec {
            key: "reclaimed",
            header: "認領回隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "adopted_out",
            header: "開放認養隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "euthanized",
            header: "人道處理隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "died_in_shelter",
            header: "所內死亡隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "year_end_count",
            header: "年底留容隻數",
            aliases: &[],
        },
    ],
};

static SHELTER_2015H2_LAYOUT: SheetLayout = SheetLayout {
    region_header: "縣市別",
    year_header: None,
    fields: &[
        ColumnSpec {
            key: "accept_gross",
            header: "收容隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "tnvr_at_intake",
            header: "絕育後回置隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "reclaimed",
            header: "認領回隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "adopted_out",
            header: "開放認養隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "euthanized",
            header: "人道處理隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "died_in_shelter",
            header: "所內死亡隻數",
            aliases: &[],
        },
        ColumnSpec {
            key: "year_end_count",
            header: "年底留容隻數",
            aliases: &[],
        },
    ],
};

static REGISTRY_LAYOUT: SheetLayout = SheetLayout {
    region_header: "縣市",
    year_header: Some("年度"),
    fields: &[
        ColumnSpec {
            key: "dog_registered",
            header: "犬隻登記數",
            aliases: &[],
        },
        ColumnSpec {
            key: "dog_neutered",
            header: "犬隻絕育數",
            aliases: &[],
        },
    ],
};

/// Sheet layout for a schema version, `None` for non-tabular versions
pub fn sheet_layout(version: SchemaVersion) -> Option<&'static SheetLayout> {
    match version {
        SchemaVersion::V2012 | SchemaVersion::V2015H1 => Some(&SHELTER_2012_LAYOUT),
        SchemaVersion::V2015H2 => Some(&SHELTER_2015H2_LAYOUT),
        SchemaVersion::Registry => Some(&REGISTRY_LAYOUT),
        _ => None,
    }
}

/// (year, field key) pairs a sheet is known to lack
///
/// Absence of any other tracked field is a hard failure.
pub static KNOWN_MISSING: &[(i32, &str)] = &[
    // the 2012 annual sheet predates the in-shelter death column
    (2012, "died_in_shelter"),
];

/// One reconciliation rule: source field → canonical metric
///
/// `negate` marks split sub-fields that accumulate with a negative sign,
/// e.g. sterilized-and-released animals counted inside gross intake.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub source: &'static str,
    pub metric: &'static str,
    pub negate: bool,
}

static V2012_RULES: &[FieldRule] = &[
    FieldRule { source: "in_shelter_total", metric: "accept", negate: false },
    FieldRule { source: "reclaimed", metric: "return", negate: false },
    FieldRule { source: "adopted_out", metric: "adopt", negate: false },
    FieldRule { source: "euthanized", metric: "euthanized", negate: false },
    FieldRule { source: "died_in_shelter", metric: "died", negate: false },
    FieldRule { source: "year_end_count", metric: "year_end", negate: false },
];

static V2015H2_RULES: &[FieldRule] = &[
    // net intake: gross intake minus animals sterilized and released
    FieldRule { source: "accept_gross", metric: "accept", negate: false },
    FieldRule { source: "tnvr_at_intake", metric: "accept", negate: true },
    FieldRule { source: "tnvr_at_intake", metric: "tnvr", negate: false },
    FieldRule { source: "reclaimed", metric: "return", negate: false },
    FieldRule { source: "adopted_out", metric: "adopt", negate: false },
    FieldRule { source: "euthanized", metric: "euthanized", negate: false },
    FieldRule { source: "died_in_shelter", metric: "died", negate: false },
    FieldRule { source: "year_end_count", metric: "year_end", negate: false },
];

static REGISTRY_RULES: &[FieldRule] = &[
    FieldRule { source: "dog_registered", metric: "dog_registered", negate: false },
    FieldRule { source: "dog_neutered", metric: "dog_neutered", negate: false },
];

/// Field-mapping rules for a schema version
///
/// `None` means the extractor already emits canonical names (JSON API,
/// enforcement composite keys) and remapping passes records through.
pub fn field_rules(version: SchemaVersion) -> Option<&'static [FieldRule]> {
    match version {
        SchemaVersion::V2012 | SchemaVersion::V2015H1 => Some(V2012_RULES),
        SchemaVersion::V2015H2 => Some(V2015H2_RULES),
        SchemaVersion::Registry => Some(REGISTRY_RULES),
        _ => None,
    }
}

/// Metrics dropped from a sub-period because their definition does not
/// survive the mid-year schema transition
///
/// The end-of-period snapshot from the first half of the transition year is
/// a June count, not a year-end count; the merged record takes `year_end`
/// only from the later half.
pub fn split_drop_metrics(version: SchemaVersion) -> &'static [&'static str] {
    match version {
        SchemaVersion::V2015H1 => &["year_end"],
        _ => &[],
    }
}
