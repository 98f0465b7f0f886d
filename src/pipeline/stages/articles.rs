use serde::{Deserialize, Serialize};

use crate::grid::{AlignmentStyle, CellStyle, GridDocument, MergedRange};
use crate::pipeline::error::StageError;
use crate::pipeline::locate;
use crate::pipeline::schema;
use crate::pipeline::stage::{Stage, StageContext, StageId};

/// One product variant. Extraction order is output-column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub name: String,
    pub number: String,
}

/// Fallback anchor row when the source sheet carries no General-Type
/// header; articles are then searched in the rows above it.
const DEFAULT_ANCHOR_ROW: u32 = 16;

/// Stage 4: pull (name, number) article pairs from the source sheet and
/// write each as one side-column block on the template: the identifier
/// in the header row, the name as a rotated label merged over the
/// reserved rows above it.
pub struct ArticleExtractor;

impl ArticleExtractor {
    fn extract(doc: &GridDocument, name_col: u32, number_col: u32, header_row: u32) -> Vec<ArticleRecord> {
        let mut articles = Vec::new();
        let mut row = header_row + 1;
        while row <= doc.max_row() {
            let name = doc.value(row, name_col);
            let number = doc.value(row, number_col);
            if name.is_empty() && number.is_empty() {
                break;
            }
            articles.push(ArticleRecord {
                name: name.as_text(),
                number: number.as_text(),
            });
            row += 1;
        }
        articles
    }

    fn fill(template: &mut GridDocument, articles: &[ArticleRecord]) -> Result<(), StageError> {
        for (idx, article) in articles.iter().enumerate() {
            let col = schema::ARTICLE_START_COL + idx as u32;

            template.set_value(schema::TARGET_HEADER_ROW, col, article.number.as_str());
            for row in schema::ARTICLE_LABEL_TOP_ROW..=schema::TARGET_HEADER_ROW {
                template.set_style(row, col, CellStyle::filled(schema::ARTICLE_FILL));
            }

            template.add_merge(MergedRange::new(
                schema::ARTICLE_LABEL_TOP_ROW,
                col,
                schema::ARTICLE_LABEL_BOTTOM_ROW,
                col,
            ))?;
            template.set_value(schema::ARTICLE_LABEL_TOP_ROW, col, article.name.as_str());
            template.set_style(
                schema::ARTICLE_LABEL_TOP_ROW,
                col,
                CellStyle::filled(schema::ARTICLE_FILL)
                    .with_alignment(AlignmentStyle::rotated(90)),
            );
        }
        Ok(())
    }
}

impl Stage for ArticleExtractor {
    fn id(&self) -> StageId {
        StageId::Articles
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        let mut template = ctx.output_of(StageId::Template)?.clone();
        let source = ctx.source();

        let anchor_row = match locate::find_general_type_anchor(source) {
            Some(anchor) => anchor.row,
            None => {
                tracing::warn!(
                    fallback_row = DEFAULT_ANCHOR_ROW,
                    "No General-Type anchor in source, using default article search ceiling"
                );
                DEFAULT_ANCHOR_ROW
            }
        };

        let Some((name_col, number_col, header_row)) =
            locate::find_article_headers(source, anchor_row)
        else {
            tracing::warn!("Article name/number headers not found, emitting template without articles");
            return Ok(template);
        };

        let articles = Self::extract(source, name_col, number_col, header_row);
        tracing::info!(
            count = articles.len(),
            header_row,
            "Extracted article records"
        );

        Self::fill(&mut template, &articles)?;
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use std::collections::BTreeMap;

    fn template() -> GridDocument {
        let mut doc = GridDocument::new(schema::TEMPLATE_SHEET_NAME);
        doc.set_value(10, 1, "Combination");
        doc
    }

    fn run_on(source: GridDocument) -> GridDocument {
        let mut artifacts = BTreeMap::new();
        artifacts.insert(StageId::Template, template());
        let ctx = StageContext::new(StageId::Articles, &source, &artifacts);
        ArticleExtractor.run(&ctx).unwrap()
    }

    #[test]
    fn articles_become_side_columns_in_order() {
        let mut source = GridDocument::new("Sheet1");
        source.set_value(2, 1, "Article Name");
        source.set_value(2, 3, "Article No.");
        source.set_value(3, 1, "Crib Sheet A");
        source.set_value(3, 3, 40123456.0);
        source.set_value(4, 1, "Crib Sheet B");
        source.set_value(4, 3, 40654321.0);
        source.set_value(15, 1, "General Type/Sub-Type in Connect");

        let out = run_on(source);
        assert_eq!(out.value(10, 18), &CellValue::text("40123456"));
        assert_eq!(out.value(1, 18), &CellValue::text("Crib Sheet A"));
        assert_eq!(out.value(10, 19), &CellValue::text("40654321"));
        assert_eq!(out.value(1, 19), &CellValue::text("Crib Sheet B"));

        let merges = out.merges();
        assert_eq!(merges.len(), 2);
        assert_eq!(merges[0], MergedRange::new(1, 18, 9, 18));
        let label_style = out.style(1, 18).unwrap();
        assert_eq!(label_style.fill.as_deref(), Some(schema::ARTICLE_FILL));
        assert_eq!(
            label_style.alignment.as_ref().unwrap().rotation,
            Some(90)
        );
    }

    #[test]
    fn extraction_stops_at_first_fully_empty_row() {
        let mut source = GridDocument::new("Sheet1");
        source.set_value(2, 1, "Article Name");
        source.set_value(2, 3, "Article No.");
        source.set_value(3, 1, "Only One");
        source.set_value(3, 3, "A-1");
        // row 4 empty, row 5 would otherwise qualify
        source.set_value(5, 1, "Orphan");
        source.set_value(15, 1, "General Type/Sub-Type in Connect");

        let out = run_on(source);
        assert_eq!(out.value(10, 18), &CellValue::text("A-1"));
        assert!(out.value(10, 19).is_empty());
    }

    #[test]
    fn missing_headers_pass_template_through() {
        let mut source = GridDocument::new("Sheet1");
        source.set_value(15, 1, "General Type/Sub-Type in Connect");
        let out = run_on(source);
        assert_eq!(out, template());
    }

    #[test]
    fn headers_below_anchor_are_ignored() {
        let mut source = GridDocument::new("Sheet1");
        source.set_value(5, 1, "General Type/Sub-Type in Connect");
        source.set_value(8, 1, "Article Name");
        source.set_value(8, 3, "Article No.");
        let out = run_on(source);
        assert_eq!(out, template());
    }
}
