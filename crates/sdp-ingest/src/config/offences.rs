//! Enforcement-report layouts and offence category tables
//!
//! The annual animal-protection enforcement reports arrive as page-level
//! table grids captured from PDFs. Each region owns a block of quarterly
//! columns; each body row carries an offence category and a step label
//! (reported 查獲 vs. penalized 裁罰).

use crate::config::schema::SchemaVersion;

/// Expected table shape for an enforcement-report schema version
#[derive(Debug, Clone, Copy)]
pub struct PdfLayout {
    /// Header rows at the top of every page
    pub header_rows: usize,
    /// Column carrying the offence/category label
    pub category_col: usize,
    /// Column carrying the step label
    pub step_col: usize,
    /// Data columns per region block (one per reporting quarter)
    pub cols_per_region: usize,
}

static E2016_LAYOUT: PdfLayout = PdfLayout {
    header_rows: 1,
    category_col: 0,
    step_col: 2,
    cols_per_region: 4,
};

// 2017 added a quarter-label row under the region row
static E2017_LAYOUT: PdfLayout = PdfLayout {
    header_rows: 2,
    category_col: 0,
    step_col: 2,
    cols_per_region: 4,
};

/// Layout for an enforcement schema version, `None` otherwise
pub fn pdf_layout(version: SchemaVersion) -> Option<&'static PdfLayout> {
    match version {
        SchemaVersion::E2016 => Some(&E2016_LAYOUT),
        SchemaVersion::E2017 => Some(&E2017_LAYOUT),
        _ => None,
    }
}

/// Step flag for a raw step cell: 0 = reported, 1 = penalized
///
/// Cells read "查獲" / "裁罰", sometimes with a 件數 suffix.
pub fn step_flag(cell: &str) -> Option<u8> {
    let label: String = cell.chars().filter(|c| !c.is_whitespace()).collect();
    if label.starts_with("查獲") {
        Some(0)
    } else if label.starts_with("裁罰") {
        Some(1)
    } else {
        None
    }
}

/// One tracked offence category
#[derive(Debug, Clone, Copy)]
pub struct OffenceCategory {
    /// Canonical metric-key stem
    pub key: &'static str,
    /// Primary label as printed in the reports
    pub label: &'static str,
}

/// Primary category table
pub static CATEGORIES: &[OffenceCategory] = &[
    OffenceCategory { key: "abandon", label: "棄養" },
    OffenceCategory { key: "cruelty", label: "虐待" },
    OffenceCategory { key: "no_chip", label: "未辦理寵物登記" },
    OffenceCategory { key: "no_rabies_shot", label: "未施打狂犬病疫苗" },
    OffenceCategory { key: "unmanaged", label: "未妥善照顧管理" },
];

/// Known truncated-label quirks: a label *ending* in the given fragment
/// maps to the given category. PDF extraction drops trailing characters
/// when a cell wraps at the page edge.
pub static LABEL_QUIRKS: &[(&str, &str)] = &[
    ("狂犬病疫", "no_rabies_shot"),
    ("寵物登", "no_chip"),
];

/// Normalize a raw category cell and resolve it to a category key
///
/// Strips whitespace/line wraps and any parenthetical suffix, then tries
/// the primary table, then the truncated-label quirks.
pub fn category_for_label(raw: &str) -> Option<&'static str> {
    let mut label: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(idx) = label.find(['(', '（']) {
        label.truncate(idx);
    }
    if label.is_empty() {
        return None;
    }
    if let Some(cat) = CATEGORIES.iter().find(|c| c.label == label) {
        return Some(cat.key);
    }
    LABEL_QUIRKS
        .iter()
        .find(|(suffix, _)| label.ends_with(suffix))
        .map(|(_, key)| *key)
}

/// Latest year for which enforcement reports have been published upstream
///
/// The combiner aborts if an enforcement dataset claims data beyond this.
pub const ENFORCEMENT_PUBLISHED_THROUGH: i32 = 2018;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_flags() {
        assert_eq!(step_flag("查獲"), Some(0));
        assert_eq!(step_flag("查獲件數"), Some(0));
        assert_eq!(step_flag("裁罰 件數"), Some(1));
        assert_eq!(step_flag("小計"), None);
        assert_eq!(step_flag(""), None);
    }

    #[test]
    fn test_primary_labels_resolve() {
        assert_eq!(category_for_label("棄養"), Some("abandon"));
        assert_eq!(category_for_label("未施打狂犬病疫苗"), Some("no_rabies_shot"));
    }

    #[test]
    fn test_parenthetical_suffix_dropped() {
        assert_eq!(category_for_label("虐待(動保法第6條)"), Some("cruelty"));
        assert_eq!(category_for_label("棄養（第5條第3項）"), Some("abandon"));
    }

    #[test]
    fn test_line_wrap_noise_tolerated() {
        assert_eq!(category_for_label("未妥善照顧\n管理"), Some("unmanaged"));
        assert_eq!(category_for_label(" 棄養 "), Some("abandon"));
    }

    #[test]
    fn test_truncated_quirks() {
        assert_eq!(category_for_label("未施打狂犬病疫"), Some("no_rabies_shot"));
        assert_eq!(category_for_label("未辦理寵物登"), Some("no_chip"));
    }

    #[test]
    fn test_unknown_label_gives_up() {
        assert_eq!(category_for_label("合計"), None);
        assert_eq!(category_for_label(""), None);
    }
}
