//! Registered transform scripts
//!
//! One extraction script per declarative source, plus the join script the
//! combiner applies across the per-source canonical files.

use super::ast::{Expr, Op, Transform};
use crate::config::offences::ENFORCEMENT_PUBLISHED_THROUGH;
use sdp_common::{PipelineError, Result};
use std::collections::HashMap;
use std::sync::LazyLock;

static SCRIPTS: LazyLock<HashMap<&'static str, Transform>> = LazyLock::new(|| {
    let mut scripts = HashMap::new();
    scripts.insert("shelter_api", shelter_api());
    scripts
});

/// Look up a registered per-source extraction script
pub fn script(name: &str) -> Result<&'static Transform> {
    SCRIPTS
        .get(name)
        .ok_or_else(|| PipelineError::MissingTransformScript(name.to_string()))
}

/// Annual shelter statistics API → canonical records
///
/// `rpt_year` is a Minguo year; `rpt_country` is a display name. The
/// nationwide summary row carries a name the region table does not know,
/// so its projected region is null and the record conversion drops it.
fn shelter_api() -> Transform {
    Transform {
        ops: vec![
            Op::Each,
            Op::Filter(Expr::field("rpt_country").ne(Expr::str("全臺"))),
            Op::Project(vec![
                (
                    "year".into(),
                    Expr::field("rpt_year").to_int().add(Expr::int(1911)),
                ),
                ("region".into(), Expr::field("rpt_country").region_code()),
                ("accept".into(), Expr::field("accept_num").to_int()),
                ("adopt".into(), Expr::field("adopt_num").to_int()),
                ("return".into(), Expr::field("return_num").to_int()),
                ("euthanized".into(), Expr::field("humane_num").to_int()),
                ("died".into(), Expr::field("dead_num").to_int()),
                ("year_end".into(), Expr::field("end_num").to_int()),
            ]),
        ],
    }
}

/// One input of the combine join
#[derive(Debug, Clone)]
pub struct JoinInput {
    /// Canonical dataset id (file stem under the canonical directory)
    pub dataset: &'static str,
    /// Optional per-dataset reshaping before the keyed merge
    pub transform: Option<Transform>,
    /// Reject records beyond this year (upstream publication lag)
    pub embargo_after: Option<i32>,
}

static COMBINE_INPUTS: LazyLock<Vec<JoinInput>> = LazyLock::new(|| {
    vec![
        JoinInput {
            dataset: "shelter_workbook",
            transform: None,
            embargo_after: None,
        },
        JoinInput {
            dataset: "shelter_api",
            transform: None,
            embargo_after: None,
        },
        JoinInput {
            dataset: "enforcement_2016",
            transform: None,
            embargo_after: Some(ENFORCEMENT_PUBLISHED_THROUGH),
        },
        JoinInput {
            dataset: "enforcement_2017",
            transform: None,
            embargo_after: Some(ENFORCEMENT_PUBLISHED_THROUGH),
        },
        JoinInput {
            dataset: "enforcement_2018",
            transform: None,
            embargo_after: Some(ENFORCEMENT_PUBLISHED_THROUGH),
        },
        JoinInput {
            dataset: "pet_registry",
            // publish the registry metrics under their reporting names
            transform: Some(Transform {
                ops: vec![
                    Op::Each,
                    Op::Project(vec![
                        ("year".into(), Expr::field("year")),
                        ("region".into(), Expr::field("region")),
                        ("registered".into(), Expr::field("dog_registered")),
                        ("neutered".into(), Expr::field("dog_neutered")),
                    ]),
                ],
            }),
            embargo_after: None,
        },
    ]
});

/// The combine join inputs, in merge order
pub fn combine_inputs() -> &'static [JoinInput] {
    &COMBINE_INPUTS
}
