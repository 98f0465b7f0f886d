use crate::grid::GridDocument;
use crate::pipeline::error::StageError;
use crate::pipeline::stage::{Stage, StageContext, StageId};

/// Stage 1: dissolve every merged range, filling cells that were hidden
/// under the merge with the range's top-left value. Cells holding their
/// own non-empty value are left untouched.
pub struct CellUnmerger;

impl Stage for CellUnmerger {
    fn id(&self) -> StageId {
        StageId::Unmerge
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        let mut doc = ctx.source().clone();
        let merges = doc.take_merges();

        if merges.is_empty() {
            tracing::info!("No merged ranges found, passing document through");
            return Ok(doc);
        }

        let mut filled = 0usize;
        for range in &merges {
            let (top_row, top_col) = range.top_left();
            let value = doc.value(top_row, top_col).clone();
            if value.is_empty() {
                continue;
            }
            for (row, col) in range.cells() {
                if doc.value(row, col).is_empty() {
                    doc.set_value(row, col, value.clone());
                    filled += 1;
                }
            }
        }

        tracing::info!(
            ranges = merges.len(),
            cells_filled = filled,
            "Dissolved merged ranges"
        );
        Ok(doc)
    }
}
