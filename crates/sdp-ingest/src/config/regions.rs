//! Region code lookup tables
//!
//! Canonical region identity is the ISO 3166-2:TW code; display names are
//! only ever an input. The legacy table covers pre-reorganization names
//! (county-to-municipality upgrades and mergers) that still appear in older
//! releases. All lookups normalize 台→臺 and strip embedded whitespace
//! first, so line-wrapped PDF cells and glyph-variant spellings resolve to
//! the same code.

use regex::Regex;
use std::sync::LazyLock;

/// An administrative region tracked by the pipeline
#[derive(Debug, Clone, Copy)]
pub struct Region {
    /// Stable region code (ISO 3166-2:TW)
    pub code: &'static str,
    /// Current official display name
    pub name: &'static str,
}

/// Number of distinct regions national-level data must cover
pub const EXPECTED_REGION_COUNT: usize = 22;

/// Current-name table, one entry per administrative region
pub static REGIONS: &[Region] = &[
    Region { code: "TW-TPE", name: "臺北市" },
    Region { code: "TW-NWT", name: "新北市" },
    Region { code: "TW-TAO", name: "桃園市" },
    Region { code: "TW-TXG", name: "臺中市" },
    Region { code: "TW-TNN", name: "臺南市" },
    Region { code: "TW-KHH", name: "高雄市" },
    Region { code: "TW-KEE", name: "基隆市" },
    Region { code: "TW-HSZ", name: "新竹市" },
    Region { code: "TW-CYI", name: "嘉義市" },
    Region { code: "TW-HSQ", name: "新竹縣" },
    Region { code: "TW-MIA", name: "苗栗縣" },
    Region { code: "TW-CHA", name: "彰化縣" },
    Region { code: "TW-NAN", name: "南投縣" },
    Region { code: "TW-YUN", name: "雲林縣" },
    Region { code: "TW-CYQ", name: "嘉義縣" },
    Region { code: "TW-PIF", name: "屏東縣" },
    Region { code: "TW-ILA", name: "宜蘭縣" },
    Region { code: "TW-HUA", name: "花蓮縣" },
    Region { code: "TW-TTT", name: "臺東縣" },
    Region { code: "TW-PEN", name: "澎湖縣" },
    Region { code: "TW-KIN", name: "金門縣" },
    Region { code: "TW-LIE", name: "連江縣" },
];

/// Legacy-name table for pre-reorganization releases
///
/// 2010: 臺北縣 became 新北市; 臺中縣/臺南縣/高雄縣 merged into their
/// namesake municipalities. 2014: 桃園縣 became 桃園市.
static LEGACY_NAMES: &[(&str, &str)] = &[
    ("臺北縣", "TW-NWT"),
    ("桃園縣", "TW-TAO"),
    ("臺中縣", "TW-TXG"),
    ("臺南縣", "TW-TNN"),
    ("高雄縣", "TW-KHH"),
];

static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[.、．]\s*").expect("ordinal prefix pattern"));

/// Strip a leading ordinal prefix such as "3. " or "12、"
pub fn strip_ordinal_prefix(cell: &str) -> String {
    ORDINAL_PREFIX.replace(cell, "").into_owned()
}

/// Canonicalize a display name: drop whitespace (line wraps), map 台→臺
fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '台' { '臺' } else { c })
        .collect()
}

/// Resolve a raw region cell to its stable code
///
/// Tries the current-name table first, then legacy names. Returns `None`
/// for subtotal/footer labels, which callers drop silently.
pub fn resolve(cell: &str) -> Option<&'static str> {
    let name = normalize_name(&strip_ordinal_prefix(cell));
    if name.is_empty() {
        return None;
    }
    if let Some(region) = REGIONS.iter().find(|r| r.name == name) {
        return Some(region.code);
    }
    LEGACY_NAMES
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map(|(_, code)| *code)
}

/// Current display name for a region code
pub fn name_for_code(code: &str) -> Option<&'static str> {
    REGIONS.iter().find(|r| r.code == code).map(|r| r.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_expected_count() {
        assert_eq!(REGIONS.len(), EXPECTED_REGION_COUNT);
    }

    #[test]
    fn test_resolve_current_name() {
        assert_eq!(resolve("臺中市"), Some("TW-TXG"));
        assert_eq!(resolve("連江縣"), Some("TW-LIE"));
    }

    #[test]
    fn test_resolve_glyph_variant() {
        assert_eq!(resolve("台北市"), Some("TW-TPE"));
        assert_eq!(resolve("台東縣"), Some("TW-TTT"));
    }

    #[test]
    fn test_resolve_strips_ordinal_prefix() {
        assert_eq!(resolve("3. 桃園市"), Some("TW-TAO"));
        assert_eq!(resolve("12、屏東縣"), Some("TW-PIF"));
    }

    #[test]
    fn test_resolve_line_wrapped_name() {
        assert_eq!(resolve("高雄\n市"), Some("TW-KHH"));
    }

    #[test]
    fn test_resolve_legacy_names() {
        assert_eq!(resolve("臺北縣"), Some("TW-NWT"));
        assert_eq!(resolve("台北縣"), Some("TW-NWT"));
        assert_eq!(resolve("桃園縣"), Some("TW-TAO"));
    }

    #[test]
    fn test_subtotal_rows_do_not_resolve() {
        assert_eq!(resolve("總計"), None);
        assert_eq!(resolve("全臺"), None);
        assert_eq!(resolve(""), None);
    }
}
