use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::CellValue;
use super::style::CellStyle;
use super::GridError;

/// A rectangular merged region inside one document. Bounds are inclusive
/// and 1-based, matching cell addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRange {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl MergedRange {
    pub fn new(min_row: u32, min_col: u32, max_row: u32, max_col: u32) -> Self {
        Self {
            min_row,
            min_col,
            max_row,
            max_col,
        }
    }

    pub fn top_left(&self) -> (u32, u32) {
        (self.min_row, self.min_col)
    }

    /// All cell coordinates covered by the range, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| (row, col)))
    }

    pub fn overlaps(&self, other: &MergedRange) -> bool {
        self.min_row <= other.max_row
            && other.min_row <= self.max_row
            && self.min_col <= other.max_col
            && other.min_col <= self.max_col
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

/// Sparse grid of cells addressed by 1-based (row, column).
///
/// Backed by a `BTreeMap` so iteration is always top-to-bottom,
/// left-to-right — the pipeline's expansion order and first-occurrence
/// deduplication depend on that total order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    pub sheet_name: String,
    #[serde(with = "cell_entries")]
    cells: BTreeMap<(u32, u32), Cell>,
    merges: Vec<MergedRange>,
    column_widths: BTreeMap<u32, f64>,
}

/// JSON maps take string keys only, so the cell map travels as a flat
/// list of `(row, col, cell)` entries.
mod cell_entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Cell;

    pub fn serialize<S: Serializer>(
        cells: &BTreeMap<(u32, u32), Cell>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<(u32, u32, &Cell)> = cells
            .iter()
            .map(|(&(row, col), cell)| (row, col, cell))
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(u32, u32), Cell>, D::Error> {
        let entries = Vec::<(u32, u32, Cell)>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|(row, col, cell)| ((row, col), cell))
            .collect())
    }
}

impl GridDocument {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
        }
    }

    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&(row, col)).map_or(&EMPTY, |c| &c.value)
    }

    /// Set a value. Writing `Empty` into a styleless cell removes it so
    /// `max_row`/`max_col` shrink back naturally.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        let value = value.into();
        match self.cells.get_mut(&(row, col)) {
            Some(cell) => {
                cell.value = value;
                if cell.value == CellValue::Empty && cell.style.is_none() {
                    self.cells.remove(&(row, col));
                }
            }
            None => {
                if value != CellValue::Empty {
                    self.cells.insert(
                        (row, col),
                        Cell {
                            value,
                            style: None,
                        },
                    );
                }
            }
        }
    }

    pub fn clear_value(&mut self, row: u32, col: u32) {
        self.set_value(row, col, CellValue::Empty);
    }

    pub fn style(&self, row: u32, col: u32) -> Option<&CellStyle> {
        self.cells.get(&(row, col)).and_then(|c| c.style.as_ref())
    }

    pub fn set_style(&mut self, row: u32, col: u32, style: CellStyle) {
        self.cells.entry((row, col)).or_default().style = Some(style);
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    pub fn max_col(&self) -> u32 {
        self.cells.keys().map(|(_, col)| *col).max().unwrap_or(0)
    }

    pub fn merges(&self) -> &[MergedRange] {
        &self.merges
    }

    /// Register a merged range. Overlap with an existing range is a
    /// document invariant violation.
    pub fn add_merge(&mut self, range: MergedRange) -> Result<(), GridError> {
        if let Some(existing) = self.merges.iter().find(|m| m.overlaps(&range)) {
            return Err(GridError::OverlappingMerge {
                existing: *existing,
                added: range,
            });
        }
        self.merges.push(range);
        Ok(())
    }

    /// Dissolve all merged ranges, returning them for value fill-in.
    pub fn take_merges(&mut self) -> Vec<MergedRange> {
        std::mem::take(&mut self.merges)
    }

    /// Delete one row, shifting every row below it up by one so indices
    /// stay contiguous from 1. Merged ranges entirely below the row shift
    /// with it.
    pub fn delete_row(&mut self, row: u32) {
        let mut shifted = BTreeMap::new();
        for ((r, c), cell) in std::mem::take(&mut self.cells) {
            if r == row {
                continue;
            }
            let r = if r > row { r - 1 } else { r };
            shifted.insert((r, c), cell);
        }
        self.cells = shifted;

        for merge in &mut self.merges {
            if merge.min_row > row {
                merge.min_row -= 1;
                merge.max_row -= 1;
            }
        }
    }

    /// Delete several rows at once (indices refer to the document before
    /// any deletion).
    pub fn delete_rows(&mut self, rows: &[u32]) {
        let mut sorted: Vec<u32> = rows.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for row in sorted.into_iter().rev() {
            self.delete_row(row);
        }
    }

    /// The full row as trimmed-trailing display strings over columns
    /// 1..=width. This is a row's identity for deduplication.
    pub fn row_signature(&self, row: u32, width: u32) -> Vec<String> {
        (1..=width)
            .map(|col| self.value(row, col).trim_trailing().as_text())
            .collect()
    }

    /// Whether any cell in the row range [1, width] holds a non-empty value.
    pub fn row_has_data(&self, row: u32, width: u32) -> bool {
        (1..=width).any(|col| !self.value(row, col).is_empty())
    }
}
