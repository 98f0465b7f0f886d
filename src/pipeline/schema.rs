//! The fixed geometry of the source and target layouts.
//!
//! Every row/column position, phrase list, and sentinel the stages depend
//! on lives here as named data. The numeric positions are part of the
//! target layout contract and must not drift.

/// Rows scanned when searching for semantic anchor headers.
pub const ROW_SEARCH_CEILING: u32 = 50;

/// Minimum similarity for the fuzzy header fallback pass.
pub const FUZZY_MIN_SIMILARITY: f64 = 0.6;

/// Row holding the 17 target headers. Rows 1..=9 above it are reserved
/// for rotated article labels.
pub const TARGET_HEADER_ROW: u32 = 10;
pub const ARTICLE_LABEL_TOP_ROW: u32 = 1;
pub const ARTICLE_LABEL_BOTTOM_ROW: u32 = 9;

/// First body row of the target layout.
pub const BODY_START_ROW: u32 = 11;

/// Column R; article i lands at `ARTICLE_START_COL + i`.
pub const ARTICLE_START_COL: u32 = 18;

/// Column J; start of the horizontal compliance-data window.
pub const SCAN_START_COL: u32 = 10;

/// Article name/number headers are searched in columns 1..=15, strictly
/// above the General-Type anchor row.
pub const ARTICLE_HEADER_MAX_COL: u32 = 15;

/// First source data row relative to the General-Type anchor row.
pub const FIRST_DATA_ROW_OFFSET: u32 = 6;

pub const TEMPLATE_SHEET_NAME: &str = "Output Template";

/// Exact-family anchor phrases (case-insensitive substring containment).
pub const ANCHOR_EXACT_PHRASES: &[&str] = &[
    "General Type/Sub-Type in Connect",
    "General Type of Material in Connect",
];

/// Fuzzy fallback phrases for the anchor, tried only when no exact hit.
pub const ANCHOR_FUZZY_PHRASES: &[&str] = &[
    "general type sub-type connect",
    "general type material connect",
    "general type connect",
    "sub-type connect",
    "material connect",
    "general type",
    "sub type",
];

/// Header in the anchor row marking one past the end of the data window.
pub const BOUNDARY_HEADER: &str = "oldest tr date";

/// Marker in column A below which supplementary source rows start.
pub const REQUIREMENTS_MARKER: &str = "requirement";

pub const ARTICLE_NAME_HEADER: &str = "article name";
pub const ARTICLE_NUMBER_HEADER: &str = "article no";

/// Treated as absence of data during the horizontal scan.
pub const NA_SENTINEL: &str = "n/a";

/// Values that disqualify a supplementary free-text cell.
pub const SUPPLEMENT_REJECT_TOKENS: &[&str] = &["n/a", "không"];

/// Matched as whole words so "unfinished" does not qualify.
pub const FINISHED_PRODUCT_PHRASES: &[&str] = &["finished product", "finish product", "finish"];

/// A line containing any of these selects every article column.
pub const ALL_ITEMS_PHRASES: &[&str] = &["all items", "all products", "all"];

/// Written into column A of reclassified finished-product rows.
pub const ART_MARKER: &str = "Art";

/// Document type of supplementary rows; never overwritten by finalization.
pub const SUPPLEMENT_DOC_TYPE: &str = "SD";

/// Document type of expanded compliance rows.
pub const EXPAND_DOC_TYPE: &str = "TR";

/// ARGB fill behind article labels and numbers.
pub const ARTICLE_FILL: &str = "00FFD4B3";

/// Source layout: fixed base-field columns read by expansion and
/// supplementary merging.
pub mod source_col {
    pub const GENERAL_TYPE: u32 = 1; // A
    pub const SUB_TYPE: u32 = 2; // B
    pub const PRODUCER: u32 = 5; // E
    pub const MATERIAL: u32 = 6; // F
    pub const SUPPLEMENT: u32 = 7; // G
    pub const LEVEL: u32 = 8; // H
}

/// Target layout: columns written by stages 5 through 8.
pub mod target_col {
    pub const GENERAL_TYPE: u32 = 2; // B
    pub const SUB_TYPE: u32 = 3; // C
    pub const MATERIAL: u32 = 4; // D
    pub const PRODUCER: u32 = 6; // F
    pub const DOCUMENT_TYPE: u32 = 8; // H
    pub const REQUIREMENT_SOURCE: u32 = 9; // I
    pub const SUB_TYPE_DETAIL: u32 = 10; // J
    pub const REGULATION: u32 = 11; // K
    pub const LIMIT: u32 = 12; // L
    pub const FREQUENCY: u32 = 14; // N
    pub const LEVEL: u32 = 16; // P, helper cleared by finalization
    pub const SUPPLEMENT_TAG: u32 = 17; // Q
}

/// Row offsets relative to the anchor row for the five per-column fields
/// read during row expansion.
pub mod field_offset {
    pub const REQUIREMENT_SOURCE: u32 = 0;
    pub const SUB_TYPE_DETAIL: u32 = 1;
    pub const REGULATION: u32 = 2;
    pub const FREQUENCY: u32 = 4;
    pub const LIMIT: u32 = 5;
}

/// One target header: name, ARGB fill, ARGB font color, column width.
#[derive(Debug, Clone, Copy)]
pub struct HeaderSpec {
    pub name: &'static str,
    pub fill: &'static str,
    pub font_color: &'static str,
    pub width: f64,
}

const YELLOW: &str = "00FFFF00";
const RED: &str = "00FF0000";
const BLUE: &str = "000000FF";
const GREEN: &str = "00B8E6B8";
const BLACK: &str = "00000000";
const WHITE: &str = "00FFFFFF";

/// The 17 target headers written at [`TARGET_HEADER_ROW`], columns A..Q.
/// Three color groups: red for material identity, blue for regulatory,
/// green for testing.
pub const TARGET_HEADERS: [HeaderSpec; 17] = [
    HeaderSpec { name: "Combination", fill: YELLOW, font_color: BLACK, width: 15.0 },
    HeaderSpec { name: "General Type Component(Type)", fill: RED, font_color: WHITE, width: 20.0 },
    HeaderSpec { name: "Sub-Type Component Identity Process Name", fill: RED, font_color: WHITE, width: 25.0 },
    HeaderSpec { name: "Material Designation", fill: RED, font_color: WHITE, width: 18.0 },
    HeaderSpec { name: "Material Distributor", fill: RED, font_color: WHITE, width: 15.0 },
    HeaderSpec { name: "Producer", fill: RED, font_color: WHITE, width: 12.0 },
    HeaderSpec { name: "Material Type In Process", fill: RED, font_color: WHITE, width: 20.0 },
    HeaderSpec { name: "Document type", fill: BLUE, font_color: WHITE, width: 15.0 },
    HeaderSpec { name: "Requirement Source/TED", fill: BLUE, font_color: WHITE, width: 20.0 },
    HeaderSpec { name: "Sub-type", fill: BLUE, font_color: WHITE, width: 12.0 },
    HeaderSpec { name: "Regulation or substances", fill: BLUE, font_color: WHITE, width: 20.0 },
    HeaderSpec { name: "Limit", fill: GREEN, font_color: BLACK, width: 10.0 },
    HeaderSpec { name: "Test method", fill: GREEN, font_color: BLACK, width: 15.0 },
    HeaderSpec { name: "Frequency", fill: GREEN, font_color: BLACK, width: 12.0 },
    HeaderSpec { name: "Level", fill: BLUE, font_color: WHITE, width: 10.0 },
    HeaderSpec { name: "Warning Limit", fill: GREEN, font_color: BLACK, width: 15.0 },
    HeaderSpec { name: "Additional Information", fill: GREEN, font_color: BLACK, width: 20.0 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_count_matches_target_width() {
        assert_eq!(TARGET_HEADERS.len() as u32, target_col::SUPPLEMENT_TAG);
    }

    #[test]
    fn body_starts_below_header_row() {
        assert_eq!(BODY_START_ROW, TARGET_HEADER_ROW + 1);
        assert_eq!(ARTICLE_LABEL_BOTTOM_ROW + 1, TARGET_HEADER_ROW);
    }
}
