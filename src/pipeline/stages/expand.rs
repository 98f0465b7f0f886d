use crate::grid::{CellValue, GridDocument};
use crate::pipeline::error::StageError;
use crate::pipeline::locate;
use crate::pipeline::schema::{self, field_offset, source_col, target_col};
use crate::pipeline::stage::{Stage, StageContext, StageId};

/// Base fields shared by every output row fanned out from one source row.
#[derive(Debug, Clone, PartialEq)]
struct BaseFields {
    general_type: CellValue,
    sub_type: CellValue,
    material_designation: CellValue,
    producer: CellValue,
    level: CellValue,
}

/// One output row: the source row's base fields plus the five fields
/// read at fixed offsets under the anchor, at one surviving column.
#[derive(Debug, Clone, PartialEq)]
struct ExpandedRow {
    base: BaseFields,
    requirement_source: CellValue,
    sub_type_detail: CellValue,
    regulation: CellValue,
    limit: CellValue,
    frequency: CellValue,
}

impl ExpandedRow {
    fn write(&self, doc: &mut GridDocument, row: u32) {
        doc.set_value(row, target_col::GENERAL_TYPE, self.base.general_type.clone());
        doc.set_value(row, target_col::SUB_TYPE, self.base.sub_type.clone());
        doc.set_value(row, target_col::MATERIAL, self.base.material_designation.clone());
        doc.set_value(row, target_col::PRODUCER, self.base.producer.clone());
        doc.set_value(row, target_col::DOCUMENT_TYPE, schema::EXPAND_DOC_TYPE);
        doc.set_value(row, target_col::LEVEL, self.base.level.clone());

        doc.set_value(row, target_col::REQUIREMENT_SOURCE, self.requirement_source.clone());
        doc.set_value(row, target_col::SUB_TYPE_DETAIL, self.sub_type_detail.clone());
        doc.set_value(row, target_col::REGULATION, self.regulation.clone());
        doc.set_value(row, target_col::LIMIT, self.limit.clone());
        doc.set_value(row, target_col::FREQUENCY, self.frequency.clone());
    }
}

/// Cells skipped by the horizontal scan: empty or the N/A sentinel.
fn is_valid_scan_cell(value: &CellValue) -> bool {
    !value.is_empty() && !value.normalized().eq_ignore_ascii_case(schema::NA_SENTINEL)
}

/// Stage 5: fan each source data row out into one output row per valid
/// cell in its horizontal compliance window, appending to the template
/// body in (source row, column) order.
pub struct RowExpander;

impl RowExpander {
    fn base_fields(source: &GridDocument, row: u32) -> BaseFields {
        BaseFields {
            general_type: source.value(row, source_col::GENERAL_TYPE).clone(),
            sub_type: source.value(row, source_col::SUB_TYPE).clone(),
            material_designation: source.value(row, source_col::MATERIAL).clone(),
            producer: source.value(row, source_col::PRODUCER).clone(),
            level: source.value(row, source_col::LEVEL).clone(),
        }
    }

    fn column_fields(source: &GridDocument, anchor_row: u32, col: u32, base: &BaseFields) -> ExpandedRow {
        ExpandedRow {
            base: base.clone(),
            requirement_source: source
                .value(anchor_row + field_offset::REQUIREMENT_SOURCE, col)
                .clone(),
            sub_type_detail: source
                .value(anchor_row + field_offset::SUB_TYPE_DETAIL, col)
                .clone(),
            regulation: source.value(anchor_row + field_offset::REGULATION, col).clone(),
            limit: source.value(anchor_row + field_offset::LIMIT, col).clone(),
            frequency: source.value(anchor_row + field_offset::FREQUENCY, col).clone(),
        }
    }

    fn scan_window_end(source: &GridDocument, anchor_row: u32) -> u32 {
        match locate::find_boundary_column(source, anchor_row) {
            Some(boundary) if boundary > schema::SCAN_START_COL => boundary - 1,
            _ => source.max_col(),
        }
    }
}

impl Stage for RowExpander {
    fn id(&self) -> StageId {
        StageId::Expand
    }

    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError> {
        let source = ctx.output_of(StageId::Headers)?;
        let mut out = ctx.output_of(StageId::Articles)?.clone();

        let anchor = locate::find_general_type_anchor(source).ok_or(
            StageError::AnchorNotFound {
                searched_rows: schema::ROW_SEARCH_CEILING,
            },
        )?;
        let first_data_row = anchor.row + schema::FIRST_DATA_ROW_OFFSET;
        let last_data_row = locate::last_data_row(source, first_data_row);
        let end_col = Self::scan_window_end(source, anchor.row);

        tracing::info!(
            anchor_row = anchor.row,
            first_data_row,
            last_data_row,
            end_col,
            "Expanding source rows"
        );

        let mut output_row = schema::BODY_START_ROW;
        let mut rows_created = 0usize;

        for data_row in first_data_row..=last_data_row {
            let base = Self::base_fields(source, data_row);
            for col in schema::SCAN_START_COL..=end_col {
                if !is_valid_scan_cell(source.value(data_row, col)) {
                    continue;
                }
                let expanded = Self::column_fields(source, anchor.row, col, &base);
                expanded.write(&mut out, output_row);
                output_row += 1;
                rows_created += 1;
            }
        }

        tracing::info!(rows_created, "Row expansion complete");
        Ok(out)
    }
}
