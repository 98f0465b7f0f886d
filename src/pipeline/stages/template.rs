use crate::grid::{AlignmentStyle, CellStyle, GridDocument};
use crate::pipeline::error::StageError;
use crate::pipeline::schema;
use crate::pipeline::stage::{Stage, StageContext, StageId};

/// Stage 3: synthesize the fixed target layout. Seventeen styled headers
/// at row 10 in three color groups, column widths set, rows 1..=9 left
/// empty for the article labels written by stage 4.
pub struct TemplateBuilder;

impl Stage for TemplateBuilder {
    fn id(&self) -> StageId {
        StageId::Template
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        ctx.output_of(StageId::Headers)?;

        let mut doc = GridDocument::new(schema::TEMPLATE_SHEET_NAME);
        for (idx, header) in schema::TARGET_HEADERS.iter().enumerate() {
            let col = idx as u32 + 1;
            doc.set_value(schema::TARGET_HEADER_ROW, col, header.name);
            doc.set_style(
                schema::TARGET_HEADER_ROW,
                col,
                CellStyle::filled(header.fill)
                    .with_font(true, header.font_color)
                    .with_alignment(AlignmentStyle::centered()),
            );
            doc.set_column_width(col, header.width);
        }

        tracing::info!(
            headers = schema::TARGET_HEADERS.len(),
            row = schema::TARGET_HEADER_ROW,
            "Created output template"
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use std::collections::BTreeMap;

    fn build() -> GridDocument {
        let empty = GridDocument::new("Sheet1");
        let mut artifacts = BTreeMap::new();
        artifacts.insert(StageId::Headers, GridDocument::new("Sheet1"));
        let ctx = StageContext::new(StageId::Template, &empty, &artifacts);
        TemplateBuilder.run(&ctx).unwrap()
    }

    #[test]
    fn headers_land_in_row_ten() {
        let doc = build();
        assert_eq!(doc.sheet_name, "Output Template");
        assert_eq!(doc.value(10, 1), &CellValue::text("Combination"));
        assert_eq!(doc.value(10, 17), &CellValue::text("Additional Information"));
        assert_eq!(doc.max_row(), 10);
        assert_eq!(doc.max_col(), 17);
    }

    #[test]
    fn rows_above_headers_are_reserved_empty() {
        let doc = build();
        for row in 1..10 {
            for col in 1..=17 {
                assert!(doc.value(row, col).is_empty());
            }
        }
    }

    #[test]
    fn headers_carry_fill_and_width() {
        let doc = build();
        let style = doc.style(10, 2).unwrap();
        assert_eq!(style.fill.as_deref(), Some("00FF0000"));
        assert!(style.font.as_ref().unwrap().bold);
        assert_eq!(doc.column_width(3), Some(25.0));
    }
}
