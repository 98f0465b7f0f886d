pub mod cell;
pub mod document;
pub mod store;
pub mod style;

pub use cell::CellValue;
pub use document::{Cell, GridDocument, MergedRange};
pub use store::{DocumentStore, JsonStore};
pub use style::{AlignmentStyle, CellStyle, FontStyle};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error(
        "Merged range r{}c{}:r{}c{} overlaps existing range r{}c{}:r{}c{}",
        added.min_row, added.min_col, added.max_row, added.max_col,
        existing.min_row, existing.min_col, existing.max_row, existing.max_col
    )]
    OverlappingMerge {
        existing: MergedRange,
        added: MergedRange,
    },

    #[error("Document not found: {0}")]
    NotFound(String),
}
