use crate::grid::GridDocument;
use crate::pipeline::error::StageError;
use crate::pipeline::locate;
use crate::pipeline::schema;
use crate::pipeline::stage::{Stage, StageContext, StageId};

/// Stage 2: consolidate the three classification rows under the
/// General-Type anchor into at most two, column by column.
pub struct HeaderConsolidator;

/// The 3-case rule applied per column to the values at anchor+1..+3:
/// all three equal and non-empty keeps only the middle; a repeated tail
/// keeps the first two; anything else joins rows two and three.
fn consolidate(first: &str, second: &str, third: &str) -> (String, String, String) {
    if first == second && second == third && !first.is_empty() {
        return (String::new(), second.to_string(), String::new());
    }
    if first != second && second == third {
        return (first.to_string(), second.to_string(), String::new());
    }
    let combined = match (second.is_empty(), third.is_empty()) {
        (false, false) => format!("{second} {third}"),
        (false, true) => second.to_string(),
        (true, false) => third.to_string(),
        (true, true) => String::new(),
    };
    (first.to_string(), combined, String::new())
}

/// An empty consolidated value removes the cell; blank text would keep a
/// phantom cell alive and inflate the document extent.
fn write_consolidated(doc: &mut GridDocument, row: u32, col: u32, new_value: String, old: &str) {
    if new_value == old {
        return;
    }
    if new_value.is_empty() {
        doc.clear_value(row, col);
    } else {
        doc.set_value(row, col, new_value);
    }
}

impl Stage for HeaderConsolidator {
    fn id(&self) -> StageId {
        StageId::Headers
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        let mut doc = ctx.output_of(StageId::Unmerge)?.clone();

        let anchor = locate::find_general_type_anchor(&doc).ok_or(
            StageError::AnchorNotFound {
                searched_rows: schema::ROW_SEARCH_CEILING,
            },
        )?;
        let end_col = locate::last_data_column(&doc, anchor.row);

        tracing::info!(
            anchor_row = anchor.row,
            matched = %anchor.matched_text,
            start_col = schema::SCAN_START_COL,
            end_col,
            "Consolidating classification headers"
        );

        for col in schema::SCAN_START_COL..=end_col {
            let first = doc.value(anchor.row + 1, col).normalized();
            let second = doc.value(anchor.row + 2, col).normalized();
            let third = doc.value(anchor.row + 3, col).normalized();

            let (new_first, new_second, new_third) = consolidate(&first, &second, &third);

            write_consolidated(&mut doc, anchor.row + 1, col, new_first, &first);
            write_consolidated(&mut doc, anchor.row + 2, col, new_second, &second);
            write_consolidated(&mut doc, anchor.row + 3, col, new_third, &third);
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use std::collections::BTreeMap;

    #[test]
    fn all_equal_keeps_only_middle() {
        assert_eq!(
            consolidate("Lead", "Lead", "Lead"),
            ("".into(), "Lead".into(), "".into())
        );
    }

    #[test]
    fn repeated_tail_keeps_first_two() {
        assert_eq!(
            consolidate("Chemical", "Lead", "Lead"),
            ("Chemical".into(), "Lead".into(), "".into())
        );
    }

    #[test]
    fn all_distinct_joins_second_and_third() {
        assert_eq!(
            consolidate("Chemical", "Lead", "Content"),
            ("Chemical".into(), "Lead Content".into(), "".into())
        );
    }

    #[test]
    fn empty_operands_do_not_leave_stray_spaces() {
        assert_eq!(
            consolidate("Chemical", "", "Content"),
            ("Chemical".into(), "Content".into(), "".into())
        );
        assert_eq!(consolidate("", "", ""), ("".into(), "".into(), "".into()));
    }

    #[test]
    fn columns_outside_window_are_untouched() {
        let mut source = GridDocument::new("Sheet1");
        source.set_value(15, 1, "General Type/Sub-Type in Connect");
        source.set_value(15, 13, "Oldest TR date");
        // inside the window
        source.set_value(16, 10, "Lead");
        source.set_value(17, 10, "Lead");
        source.set_value(18, 10, "Lead");
        // outside (column 13 is the boundary header itself)
        source.set_value(16, 13, "Keep");
        source.set_value(17, 13, "Keep");
        source.set_value(18, 13, "Keep");

        let empty = GridDocument::new("Sheet1");
        let mut artifacts = BTreeMap::new();
        artifacts.insert(StageId::Unmerge, source);
        let ctx = StageContext::new(StageId::Headers, &empty, &artifacts);
        let out = HeaderConsolidator.run(&ctx).unwrap();

        assert_eq!(out.value(16, 10), &CellValue::Empty);
        assert_eq!(out.value(17, 10), &CellValue::text("Lead"));
        assert_eq!(out.value(18, 10), &CellValue::Empty);
        assert_eq!(out.value(16, 13), &CellValue::text("Keep"));
    }

    #[test]
    fn cleared_cells_shrink_the_document_extent() {
        let mut source = GridDocument::new("Sheet1");
        source.set_value(15, 1, "General Type/Sub-Type in Connect");
        source.set_value(15, 13, "Oldest TR date");
        source.set_value(16, 10, "Lead");
        source.set_value(17, 10, "Lead");
        source.set_value(18, 10, "Lead");

        let empty = GridDocument::new("Sheet1");
        let mut artifacts = BTreeMap::new();
        artifacts.insert(StageId::Unmerge, source);
        let ctx = StageContext::new(StageId::Headers, &empty, &artifacts);
        let out = HeaderConsolidator.run(&ctx).unwrap();

        // row 18 cleared entirely, so the extent drops to the kept middle row
        assert_eq!(out.value(17, 10), &CellValue::text("Lead"));
        assert_eq!(out.max_row(), 17);
    }

    #[test]
    fn missing_anchor_is_a_stage_error() {
        let empty = GridDocument::new("Sheet1");
        let mut artifacts = BTreeMap::new();
        artifacts.insert(StageId::Unmerge, GridDocument::new("Sheet1"));
        let ctx = StageContext::new(StageId::Headers, &empty, &artifacts);
        let err = HeaderConsolidator.run(&ctx).unwrap_err();
        assert!(matches!(err, StageError::AnchorNotFound { .. }));
    }
}
