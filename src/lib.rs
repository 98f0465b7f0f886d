//! Converts vendor compliance spreadsheets into the standardized TSS
//! layout through a fixed eight-stage transformation pipeline.
//!
//! The pipeline dissolves merged cells, consolidates the classification
//! header block, synthesizes the 17-column target template, extracts
//! article identity pairs, fans source rows out into one output row per
//! compliance cell, merges supplementary entries with whole-body
//! deduplication, classifies finished products against articles, and
//! finalizes the document.
//!
//! [`PipelineRunner`] orchestrates the stages over a [`grid::DocumentStore`];
//! the convenience functions below wire it to the built-in JSON store.

pub mod config;
pub mod grid;
pub mod pipeline;

pub use grid::{CellValue, GridDocument, GridError};
pub use pipeline::{PipelineError, PipelineRunner, RunOutcome, StageId, ValidationReport};

use std::path::Path;

use grid::JsonStore;

/// Run the full pipeline on `source`, writing every stage artifact under
/// `output_dir`. Returns the paths of the final document and all
/// intermediate artifacts.
pub fn convert(source: &Path, output_dir: &Path) -> Result<RunOutcome, PipelineError> {
    let runner = PipelineRunner::new(JsonStore::new(output_dir))?;
    runner.run(source)
}

/// Pre-flight validation of `source` without running any stage.
pub fn validate(source: &Path) -> ValidationReport {
    let store = JsonStore::new(config::default_output_dir());
    pipeline::validator::validate(&store, source)
}
