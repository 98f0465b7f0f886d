use serde::{Deserialize, Serialize};

use crate::grid::GridDocument;
use super::schema;

/// Result of an anchor search. Confidence is 1.0 for exact-family hits
/// and the similarity score for fuzzy ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderAnchor {
    pub row: u32,
    pub col: u32,
    pub matched_text: String,
    pub confidence: f64,
}

/// Find the General-Type anchor cell.
///
/// First pass is case-insensitive substring containment of the exact
/// phrase family; second pass scores every non-empty text cell against
/// the fuzzy fallback phrases with normalized Levenshtein and keeps the
/// single best hit at or above the similarity floor. Both passes are
/// bounded to the first [`schema::ROW_SEARCH_CEILING`] rows.
pub fn find_general_type_anchor(doc: &GridDocument) -> Option<HeaderAnchor> {
    let max_row = doc.max_row().min(schema::ROW_SEARCH_CEILING);
    let max_col = doc.max_col();

    for row in 1..=max_row {
        for col in 1..=max_col {
            let text = doc.value(row, col).normalized();
            if text.is_empty() {
                continue;
            }
            let lower = text.to_lowercase();
            if schema::ANCHOR_EXACT_PHRASES
                .iter()
                .any(|p| lower.contains(&p.to_lowercase()))
            {
                return Some(HeaderAnchor {
                    row,
                    col,
                    matched_text: text,
                    confidence: 1.0,
                });
            }
        }
    }

    let mut best: Option<HeaderAnchor> = None;
    for row in 1..=max_row {
        for col in 1..=max_col {
            let text = doc.value(row, col).normalized();
            if text.is_empty() {
                continue;
            }
            let lower = text.to_lowercase();
            for phrase in schema::ANCHOR_FUZZY_PHRASES {
                let score = strsim::normalized_levenshtein(&lower, phrase);
                if score >= schema::FUZZY_MIN_SIMILARITY
                    && best.as_ref().map_or(true, |b| score > b.confidence)
                {
                    best = Some(HeaderAnchor {
                        row,
                        col,
                        matched_text: text.clone(),
                        confidence: score,
                    });
                }
            }
        }
    }

    if let Some(anchor) = &best {
        tracing::info!(
            row = anchor.row,
            col = anchor.col,
            text = %anchor.matched_text,
            confidence = anchor.confidence,
            "Anchor found via fuzzy fallback"
        );
    }
    best
}

/// Column holding the boundary header in the anchor row, if present.
pub fn find_boundary_column(doc: &GridDocument, anchor_row: u32) -> Option<u32> {
    (1..=doc.max_col()).find(|&col| {
        doc.value(anchor_row, col)
            .normalized()
            .to_lowercase()
            .contains(schema::BOUNDARY_HEADER)
    })
}

/// Last column of the horizontal data window: one before the boundary
/// header when found, else backward scan for the last column holding any
/// data in the first [`schema::ROW_SEARCH_CEILING`] rows.
pub fn last_data_column(doc: &GridDocument, anchor_row: u32) -> u32 {
    if let Some(boundary) = find_boundary_column(doc, anchor_row) {
        if boundary > 1 {
            return boundary - 1;
        }
    }

    let scan_rows = doc.max_row().min(schema::ROW_SEARCH_CEILING);
    for col in (1..=doc.max_col()).rev() {
        if (1..=scan_rows).any(|row| !doc.value(row, col).is_empty()) {
            return col;
        }
    }
    doc.max_col()
}

/// Row whose column A contains the requirements marker.
pub fn find_requirements_row(doc: &GridDocument) -> Option<u32> {
    (1..=doc.max_row()).find(|&row| {
        doc.value(row, 1)
            .normalized()
            .to_lowercase()
            .contains(schema::REQUIREMENTS_MARKER)
    })
}

/// Last row with data in the first two columns, searching backward from
/// the bottom. Falls back to `start_row` on an empty region.
pub fn last_data_row(doc: &GridDocument, start_row: u32) -> u32 {
    for row in (start_row..=doc.max_row().max(start_row)).rev() {
        if (1..=2).any(|col| !doc.value(row, col).is_empty()) {
            return row;
        }
    }
    start_row
}

/// Article name/number header pair, searched strictly above `ceiling_row`
/// in columns 1..=[`schema::ARTICLE_HEADER_MAX_COL`]. Returns
/// (name_col, number_col, header_row).
pub fn find_article_headers(doc: &GridDocument, ceiling_row: u32) -> Option<(u32, u32, u32)> {
    let mut name_col = None;
    let mut number_col = None;
    let mut header_row = None;

    for row in 1..ceiling_row {
        for col in 1..=schema::ARTICLE_HEADER_MAX_COL.min(doc.max_col()) {
            let lower = doc.value(row, col).normalized().to_lowercase();
            if lower.is_empty() {
                continue;
            }
            if name_col.is_none() && lower.contains(schema::ARTICLE_NAME_HEADER) {
                name_col = Some(col);
                header_row.get_or_insert(row);
            } else if number_col.is_none() && lower.contains(schema::ARTICLE_NUMBER_HEADER) {
                number_col = Some(col);
                header_row.get_or_insert(row);
            }
        }
    }

    match (name_col, number_col, header_row) {
        (Some(name), Some(number), Some(row)) => Some((name, number, row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(cells: &[(u32, u32, &str)]) -> GridDocument {
        let mut doc = GridDocument::new("Sheet1");
        for &(row, col, text) in cells {
            doc.set_value(row, col, text);
        }
        doc
    }

    #[test]
    fn exact_anchor_match_has_full_confidence() {
        let doc = doc_with(&[(15, 1, "General Type/Sub-Type in Connect")]);
        let anchor = find_general_type_anchor(&doc).unwrap();
        assert_eq!((anchor.row, anchor.col), (15, 1));
        assert_eq!(anchor.confidence, 1.0);
    }

    #[test]
    fn fuzzy_fallback_finds_misspelled_anchor() {
        let doc = doc_with(&[(12, 1, "Genera1 Type")]);
        let anchor = find_general_type_anchor(&doc).unwrap();
        assert_eq!(anchor.row, 12);
        assert!(anchor.confidence >= 0.6);
        assert!(anchor.confidence < 1.0);
    }

    #[test]
    fn no_anchor_in_unrelated_sheet() {
        let doc = doc_with(&[(1, 1, "Quarterly revenue"), (2, 1, "Totals")]);
        assert!(find_general_type_anchor(&doc).is_none());
    }

    #[test]
    fn boundary_column_limits_data_window() {
        let doc = doc_with(&[(15, 1, "General Type"), (15, 13, "Oldest TR date")]);
        assert_eq!(find_boundary_column(&doc, 15), Some(13));
        assert_eq!(last_data_column(&doc, 15), 12);
    }

    #[test]
    fn last_data_column_falls_back_to_rightmost_data() {
        let doc = doc_with(&[(3, 7, "x"), (20, 4, "y")]);
        assert_eq!(last_data_column(&doc, 1), 7);
    }

    #[test]
    fn requirements_marker_is_case_insensitive() {
        let doc = doc_with(&[(19, 1, "REQUIREMENTS")]);
        assert_eq!(find_requirements_row(&doc), Some(19));
    }

    #[test]
    fn article_headers_only_found_above_ceiling() {
        let doc = doc_with(&[
            (2, 1, "Article Name"),
            (2, 3, "Article No."),
            (15, 1, "General Type/Sub-Type in Connect"),
        ]);
        assert_eq!(find_article_headers(&doc, 15), Some((1, 3, 2)));
        assert_eq!(find_article_headers(&doc, 2), None);
    }

    #[test]
    fn last_data_row_searches_first_two_columns_only() {
        let doc = doc_with(&[(5, 2, "b"), (9, 8, "ignored")]);
        assert_eq!(last_data_row(&doc, 3), 5);
        assert_eq!(last_data_row(&doc, 6), 6);
    }
}
