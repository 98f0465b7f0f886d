use std::sync::OnceLock;

use regex::Regex;

use crate::grid::GridDocument;
use crate::pipeline::error::StageError;
use crate::pipeline::schema::{self, target_col};
use crate::pipeline::stage::{Stage, StageContext, StageId};
use super::supplement::split_lines;

/// Word-bounded so "unfinished" does not qualify.
fn finished_product_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternatives = schema::FINISHED_PRODUCT_PHRASES.join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("valid phrase pattern")
    })
}

pub fn is_finished_product(text: &str) -> bool {
    finished_product_pattern().is_match(text)
}

fn is_all_items_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    schema::ALL_ITEMS_PHRASES.iter().any(|p| lower.contains(p))
}

/// Stage 7, two passes: reclassify finished-product rows, then mark each
/// body row against the article columns via its level field.
pub struct ProductClassifier;

impl ProductClassifier {
    fn reclassify_finished_products(doc: &mut GridDocument) -> usize {
        let mut count = 0usize;
        for row in schema::BODY_START_ROW..=doc.max_row() {
            let general_type = doc.value(row, target_col::GENERAL_TYPE).normalized();
            if !is_finished_product(&general_type) {
                continue;
            }
            doc.set_value(row, 1, schema::ART_MARKER);
            doc.clear_value(row, target_col::GENERAL_TYPE);
            doc.clear_value(row, target_col::SUB_TYPE);
            doc.clear_value(row, target_col::MATERIAL);
            doc.clear_value(row, target_col::PRODUCER);
            count += 1;
        }
        count
    }

    /// Article labels from row 1, consecutive from the first side column.
    fn article_columns(doc: &GridDocument) -> Vec<(u32, String)> {
        let mut labels = Vec::new();
        for col in schema::ARTICLE_START_COL..=doc.max_col().max(schema::ARTICLE_START_COL) {
            let name = doc.value(schema::ARTICLE_LABEL_TOP_ROW, col).normalized();
            if name.is_empty() {
                break;
            }
            labels.push((col, name));
        }
        labels
    }

    fn match_articles(doc: &mut GridDocument) -> usize {
        let labels = Self::article_columns(doc);
        if labels.is_empty() {
            tracing::warn!("No article labels present, skipping article matching");
            return 0;
        }

        let mut unmatched = 0usize;
        for row in schema::BODY_START_ROW..=doc.max_row() {
            if !doc.row_has_data(row, schema::TARGET_HEADERS.len() as u32) {
                continue;
            }
            let level = doc.value(row, target_col::LEVEL).as_text();
            let lines = split_lines(&level);

            let select_all = lines.is_empty() || lines.iter().any(|l| is_all_items_line(l));
            if select_all {
                for (col, _) in &labels {
                    doc.set_value(row, *col, "X");
                }
                continue;
            }

            let mut matched_cols = Vec::new();
            for line in &lines {
                let line_lower = line.to_lowercase();
                for (col, name) in &labels {
                    if line_lower.contains(&name.to_lowercase()) && !matched_cols.contains(col) {
                        matched_cols.push(*col);
                    }
                }
            }

            if matched_cols.is_empty() {
                tracing::debug!(row, level = %level, "No article match for row");
                unmatched += 1;
            }
            for col in matched_cols {
                doc.set_value(row, col, "X");
            }
        }

        if unmatched > 0 {
            tracing::info!(unmatched, "Rows left without article marks");
        }
        unmatched
    }
}

impl Stage for ProductClassifier {
    fn id(&self) -> StageId {
        StageId::Classify
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        let mut doc = ctx.output_of(StageId::Supplement)?.clone();

        let reclassified = Self::reclassify_finished_products(&mut doc);
        let unmatched = Self::match_articles(&mut doc);

        tracing::info!(reclassified, unmatched, "Classification complete");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use std::collections::BTreeMap;

    fn run_on(table: GridDocument) -> GridDocument {
        let empty = GridDocument::new("Sheet1");
        let mut artifacts = BTreeMap::new();
        artifacts.insert(StageId::Supplement, table);
        let ctx = StageContext::new(StageId::Classify, &empty, &artifacts);
        ProductClassifier.run(&ctx).unwrap()
    }

    fn table_with_articles() -> GridDocument {
        let mut doc = GridDocument::new("t");
        doc.set_value(1, 18, "Crib Sheet A");
        doc.set_value(1, 19, "Crib Sheet B");
        doc.set_value(10, 18, "40123456");
        doc.set_value(10, 19, "40654321");
        doc
    }

    #[test]
    fn finished_product_phrases_match_as_words() {
        assert!(is_finished_product("Finished Product"));
        assert!(is_finished_product("finish product"));
        assert!(is_finished_product("FINISH"));
        assert!(!is_finished_product("unfinished"));
        assert!(!is_finished_product("refinishing"));
    }

    #[test]
    fn finished_product_row_is_rewritten() {
        let mut table = table_with_articles();
        table.set_value(11, 2, "Finished product TSS");
        table.set_value(11, 3, "Garment");
        table.set_value(11, 4, "CO-100");
        table.set_value(11, 6, "Acme");
        table.set_value(11, 9, "REQ");

        let out = run_on(table);
        assert_eq!(out.value(11, 1), &CellValue::text("Art"));
        assert!(out.value(11, 2).is_empty());
        assert!(out.value(11, 3).is_empty());
        assert!(out.value(11, 4).is_empty());
        assert!(out.value(11, 6).is_empty());
        assert_eq!(out.value(11, 9).as_text(), "REQ");
    }

    #[test]
    fn empty_level_selects_every_article() {
        let mut table = table_with_articles();
        table.set_value(11, 2, "Textile");

        let out = run_on(table);
        assert_eq!(out.value(11, 18).as_text(), "X");
        assert_eq!(out.value(11, 19).as_text(), "X");
    }

    #[test]
    fn all_items_line_selects_every_article() {
        let mut table = table_with_articles();
        table.set_value(11, 2, "Textile");
        table.set_value(11, 16, "Crib Sheet A\nAll items");

        let out = run_on(table);
        assert_eq!(out.value(11, 18).as_text(), "X");
        assert_eq!(out.value(11, 19).as_text(), "X");
    }

    #[test]
    fn named_article_selects_only_its_column() {
        let mut table = table_with_articles();
        table.set_value(11, 2, "Textile");
        table.set_value(11, 16, "crib sheet b");

        let out = run_on(table);
        assert!(out.value(11, 18).is_empty());
        assert_eq!(out.value(11, 19).as_text(), "X");
    }

    #[test]
    fn unmatched_row_stays_unmarked() {
        let mut table = table_with_articles();
        table.set_value(11, 2, "Textile");
        table.set_value(11, 16, "Unknown product");

        let out = run_on(table);
        assert!(out.value(11, 18).is_empty());
        assert!(out.value(11, 19).is_empty());
    }
}
