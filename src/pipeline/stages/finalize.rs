use std::sync::OnceLock;

use regex::Regex;

use crate::grid::GridDocument;
use crate::pipeline::error::StageError;
use crate::pipeline::schema::{self, target_col};
use crate::pipeline::stage::{Stage, StageContext, StageId};

/// Ordinal prefix like "1/", "2/". Tags starting with one carry no
/// document type.
fn ordinal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+/").expect("valid ordinal pattern"))
}

/// Compound code family, e.g. IOS-PRG-0272 or IOS- MAT-0010.
fn compound_code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b[A-Z]{2,4}-\s*[A-Z]{2,4}-\d+").expect("valid compound pattern")
    })
}

/// Simple code family, e.g. MAT0250, MAT-10, IOS-123. The trailing
/// whitespace/colon/end guard keeps trailing words out of the code.
fn simple_code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([A-Z]{3}-?\d+)(?:[\s:]|$)").expect("valid simple pattern")
    })
}

fn segment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[&,;]+").expect("valid separator pattern"))
}

/// Extract requirement-source codes from a supplementary tag, uppercased
/// and deduplicated in first-seen order. Compound matches are cut out of
/// the segment before the simple scan so their tails are not counted
/// twice.
pub fn extract_requirement_sources(text: &str) -> Vec<String> {
    let mut codes = Vec::new();
    for segment in segment_pattern().split(text) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let mut remainder = segment.to_string();
        for found in compound_code_pattern().find_iter(segment) {
            codes.push(found.as_str().to_uppercase());
            remainder = remainder.replace(found.as_str(), "");
        }
        for caps in simple_code_pattern().captures_iter(&remainder) {
            codes.push(caps[1].to_uppercase());
        }
    }

    let mut unique = Vec::new();
    for code in codes {
        if !unique.contains(&code) {
            unique.push(code);
        }
    }
    unique
}

/// Document type derived from a tag: its first whitespace token, or
/// nothing when the tag starts with an ordinal prefix.
pub fn derive_document_type(tag: &str) -> Option<&str> {
    let tag = tag.trim();
    if ordinal_pattern().is_match(tag) {
        return None;
    }
    tag.split_whitespace().next()
}

/// Stage 8: drop finished-product tagged rows, derive document type and
/// requirement source from the remaining tags, and clear the matching
/// helper column.
pub struct DocumentFinalizer;

impl DocumentFinalizer {
    fn remove_finished_product_rows(doc: &mut GridDocument) -> usize {
        let mut to_delete = Vec::new();
        for row in schema::BODY_START_ROW..=doc.max_row() {
            let tag = doc.value(row, target_col::SUPPLEMENT_TAG).normalized();
            if tag.to_lowercase().contains("finished product") {
                to_delete.push(row);
            }
        }
        let removed = to_delete.len();
        doc.delete_rows(&to_delete);
        removed
    }

    fn fill_document_specs(doc: &mut GridDocument) -> usize {
        let mut filled = 0usize;
        for row in schema::BODY_START_ROW..=doc.max_row() {
            let tag = doc.value(row, target_col::SUPPLEMENT_TAG).normalized();
            if tag.is_empty() {
                continue;
            }

            if let Some(doc_type) = derive_document_type(&tag) {
                let existing = doc.value(row, target_col::DOCUMENT_TYPE).normalized();
                if existing != schema::SUPPLEMENT_DOC_TYPE {
                    doc.set_value(row, target_col::DOCUMENT_TYPE, doc_type);
                }
            }

            let codes = extract_requirement_sources(&tag);
            if !codes.is_empty() {
                doc.set_value(row, target_col::REQUIREMENT_SOURCE, codes.join(" & "));
            }
            filled += 1;
        }
        filled
    }

    fn clear_helper_column(doc: &mut GridDocument) -> usize {
        let mut cleared = 0usize;
        for row in schema::BODY_START_ROW..=doc.max_row() {
            if !doc.value(row, target_col::LEVEL).is_empty() {
                cleared += 1;
            }
            doc.clear_value(row, target_col::LEVEL);
        }
        cleared
    }
}

impl Stage for DocumentFinalizer {
    fn id(&self) -> StageId {
        StageId::Finalize
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        let mut doc = ctx.output_of(StageId::Classify)?.clone();

        let removed = Self::remove_finished_product_rows(&mut doc);
        let filled = Self::fill_document_specs(&mut doc);
        let cleared = Self::clear_helper_column(&mut doc);

        tracing::info!(removed, filled, cleared, "Finalized document");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn run_on(table: GridDocument) -> GridDocument {
        let empty = GridDocument::new("Sheet1");
        let mut artifacts = BTreeMap::new();
        artifacts.insert(StageId::Classify, table);
        let ctx = StageContext::new(StageId::Finalize, &empty, &artifacts);
        DocumentFinalizer.run(&ctx).unwrap()
    }

    #[test]
    fn extracts_simple_code_without_trailing_words() {
        assert_eq!(
            extract_requirement_sources("SD MAT0250: Jiangsu Reborn"),
            vec!["MAT0250"]
        );
    }

    #[test]
    fn extracts_compound_codes_preserving_order_without_duplicates() {
        assert_eq!(
            extract_requirement_sources("SD IOS-PRG-0272 & IOS-PRG-0273"),
            vec!["IOS-PRG-0272", "IOS-PRG-0273"]
        );
        assert_eq!(
            extract_requirement_sources("IOS-PRG-0272, IOS-PRG-0272"),
            vec!["IOS-PRG-0272"]
        );
    }

    #[test]
    fn compound_match_suppresses_its_simple_tail() {
        // PRG-0272 alone would satisfy the simple family
        assert_eq!(
            extract_requirement_sources("SD IOS-PRG-0272"),
            vec!["IOS-PRG-0272"]
        );
    }

    #[test]
    fn compound_with_internal_space_is_normalized_by_upcasing_only() {
        assert_eq!(
            extract_requirement_sources("SD ios- prg-0273"),
            vec!["IOS- PRG-0273"]
        );
    }

    #[test]
    fn ordinal_tags_have_no_document_type() {
        assert_eq!(derive_document_type("1/ something"), None);
        assert_eq!(derive_document_type("SD MAT0250"), Some("SD"));
        assert_eq!(derive_document_type(""), None);
    }

    #[test]
    fn finished_product_tagged_rows_are_removed() {
        let mut table = GridDocument::new("t");
        table.set_value(11, 2, "keep");
        table.set_value(11, 17, "SD note");
        table.set_value(12, 17, "Finished Product TSS");
        table.set_value(13, 2, "also keep");

        let out = run_on(table);
        assert_eq!(out.value(11, 2).as_text(), "keep");
        assert_eq!(out.value(12, 2).as_text(), "also keep");
        assert_eq!(out.max_row(), 12);
    }

    #[test]
    fn document_type_never_overwrites_supplementary_sentinel() {
        let mut table = GridDocument::new("t");
        table.set_value(11, 8, "SD");
        table.set_value(11, 17, "TR MAT0250");
        table.set_value(12, 8, "TR");
        table.set_value(12, 17, "CERT MAT0251");

        let out = run_on(table);
        assert_eq!(out.value(11, 8).as_text(), "SD");
        assert_eq!(out.value(11, 9).as_text(), "MAT0250");
        assert_eq!(out.value(12, 8).as_text(), "CERT");
        assert_eq!(out.value(12, 9).as_text(), "MAT0251");
    }

    #[test]
    fn helper_column_is_cleared_across_the_body() {
        let mut table = GridDocument::new("t");
        table.set_value(11, 16, "Crib Sheet A");
        table.set_value(12, 16, "All items");
        table.set_value(12, 2, "data");

        let out = run_on(table);
        assert!(out.value(11, 16).is_empty());
        assert!(out.value(12, 16).is_empty());
        assert_eq!(out.value(12, 2).as_text(), "data");
    }
}
