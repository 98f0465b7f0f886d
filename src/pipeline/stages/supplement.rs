use crate::grid::{CellValue, GridDocument};
use crate::pipeline::error::StageError;
use crate::pipeline::locate;
use crate::pipeline::schema::{self, source_col, target_col};
use crate::pipeline::stage::{Stage, StageContext, StageId};

/// Split a free-text cell into trimmed non-empty lines. A value without
/// a newline is one line.
pub fn split_lines(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let lines: Vec<String> = trimmed
        .split('\n')
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();
    if lines.len() <= 1 {
        vec![trimmed.to_string()]
    } else {
        lines
    }
}

fn is_valid_supplement(value: &CellValue) -> bool {
    let text = value.normalized().to_lowercase();
    !text.is_empty() && !schema::SUPPLEMENT_REJECT_TOKENS.contains(&text.as_str())
}

/// Stage 6: append one row per parsed supplementary line found under the
/// requirements marker, then deduplicate the whole body.
pub struct SupplementaryMerger;

impl SupplementaryMerger {
    fn append_entries(source: &GridDocument, out: &mut GridDocument) -> Result<usize, StageError> {
        let requirements_row = locate::find_requirements_row(source).ok_or(
            StageError::MarkerNotFound {
                marker: schema::REQUIREMENTS_MARKER,
            },
        )?;
        let start_row = requirements_row + 1;
        let end_row = locate::last_data_row(source, start_row);

        let mut output_row = out.max_row().max(schema::TARGET_HEADER_ROW) + 1;
        let mut added = 0usize;

        for row in start_row..=end_row {
            let supplement = source.value(row, source_col::SUPPLEMENT);
            if !is_valid_supplement(supplement) {
                continue;
            }

            for line in split_lines(&supplement.as_text()) {
                out.set_value(output_row, target_col::GENERAL_TYPE, source.value(row, source_col::GENERAL_TYPE).clone());
                out.set_value(output_row, target_col::SUB_TYPE, source.value(row, source_col::SUB_TYPE).clone());
                out.set_value(output_row, target_col::MATERIAL, source.value(row, source_col::MATERIAL).clone());
                out.set_value(output_row, target_col::PRODUCER, source.value(row, source_col::PRODUCER).clone());
                out.set_value(output_row, target_col::DOCUMENT_TYPE, schema::SUPPLEMENT_DOC_TYPE);
                out.set_value(output_row, target_col::LEVEL, source.value(row, source_col::LEVEL).clone());
                out.set_value(output_row, target_col::SUPPLEMENT_TAG, line);
                output_row += 1;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Trim trailing whitespace on every body cell, then drop later rows
    /// whose full column tuple repeats an earlier one.
    fn deduplicate(out: &mut GridDocument) -> usize {
        let max_row = out.max_row();
        let width = out.max_col();
        if max_row < schema::BODY_START_ROW {
            return 0;
        }

        for row in schema::BODY_START_ROW..=max_row {
            for col in 1..=width {
                let trimmed = out.value(row, col).trim_trailing();
                if &trimmed != out.value(row, col) {
                    out.set_value(row, col, trimmed);
                }
            }
        }

        let mut seen: Vec<Vec<String>> = Vec::new();
        let mut duplicates = Vec::new();
        for row in schema::BODY_START_ROW..=max_row {
            if !out.row_has_data(row, width) {
                continue;
            }
            let signature = out.row_signature(row, width);
            if seen.contains(&signature) {
                duplicates.push(row);
            } else {
                seen.push(signature);
            }
        }

        let removed = duplicates.len();
        out.delete_rows(&duplicates);
        removed
    }
}

impl Stage for SupplementaryMerger {
    fn id(&self) -> StageId {
        StageId::Supplement
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        let source = ctx.output_of(StageId::Headers)?;
        let mut out = ctx.output_of(StageId::Expand)?.clone();

        let added = Self::append_entries(source, &mut out)?;
        let removed = Self::deduplicate(&mut out);

        tracing::info!(added, removed, "Merged supplementary entries");
        Ok(out)
    }
}
