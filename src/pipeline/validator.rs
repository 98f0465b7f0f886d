use std::fs;
use std::path::Path;

use crate::grid::DocumentStore;
use super::error::{Finding, FindingCategory, Severity, ValidationReport};
use super::locate;
use super::schema;

const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "json"];
const MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;
const MIN_ROWS: u32 = 15;
const MIN_COLS: u32 = 10;

/// Pre-flight validation. The pipeline must not start while the report
/// carries any error-severity finding.
pub fn validate(store: &dyn DocumentStore, path: &Path) -> ValidationReport {
    let mut findings = Vec::new();

    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(_) => {
            findings.push(
                Finding::new(
                    FindingCategory::File,
                    Severity::Error,
                    format!("Input file not found: {}", path.display()),
                )
                .with_hint("Check the file path and ensure the file exists"),
            );
            return ValidationReport::from_findings(findings);
        }
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        findings.push(
            Finding::new(
                FindingCategory::File,
                Severity::Error,
                format!("Unsupported file extension: {ext:?}"),
            )
            .with_hint(format!("Supported extensions: {}", ALLOWED_EXTENSIONS.join(", "))),
        );
        return ValidationReport::from_findings(findings);
    }

    if meta.len() > MAX_SIZE_BYTES {
        findings.push(
            Finding::new(
                FindingCategory::File,
                Severity::Warning,
                format!(
                    "Large file: {:.1}MB exceeds the recommended {}MB",
                    meta.len() as f64 / (1024.0 * 1024.0),
                    MAX_SIZE_BYTES / (1024 * 1024)
                ),
            )
            .with_hint("Processing may be slow; consider splitting the workbook"),
        );
    }

    let doc = match store.load(path) {
        Ok(doc) => doc,
        Err(err) => {
            findings.push(
                Finding::new(
                    FindingCategory::File,
                    Severity::Error,
                    format!("Could not load document: {err}"),
                )
                .with_hint("Ensure the file is a valid grid document and not corrupted"),
            );
            return ValidationReport::from_findings(findings);
        }
    };

    let (rows, cols) = (doc.max_row(), doc.max_col());
    if rows < MIN_ROWS {
        findings.push(
            Finding::new(
                FindingCategory::Structure,
                Severity::Error,
                format!("File too small: {rows} rows (minimum {MIN_ROWS} required)"),
            )
            .with_hint("Source sheets carry headers around row 15 plus data rows"),
        );
    }
    if cols < MIN_COLS {
        findings.push(
            Finding::new(
                FindingCategory::Structure,
                Severity::Error,
                format!("File too narrow: {cols} columns (minimum {MIN_COLS} required)"),
            )
            .with_hint("Check for hidden columns or missing data"),
        );
    }

    let window_has_data = (1..=rows.min(10))
        .any(|row| (1..=cols.min(10)).any(|col| !doc.value(row, col).is_empty()));
    if !window_has_data {
        findings.push(
            Finding::new(
                FindingCategory::Structure,
                Severity::Error,
                "No data in the first 10 rows and columns".to_string(),
            )
            .with_hint("Ensure the sheet is not empty and data starts near the top"),
        );
    }

    match locate::find_general_type_anchor(&doc) {
        Some(anchor) => {
            findings.push(Finding::new(
                FindingCategory::HeaderMissing,
                Severity::Info,
                format!(
                    "General-Type anchor found: '{}' at row {}",
                    anchor.matched_text, anchor.row
                ),
            ));

            if locate::find_article_headers(&doc, anchor.row).is_none() {
                findings.push(
                    Finding::new(
                        FindingCategory::HeaderMissing,
                        Severity::Warning,
                        "Article name/number headers not found".to_string(),
                    )
                    .with_hint("The output will be produced without article columns"),
                );
            }
        }
        None => {
            findings.push(
                Finding::new(
                    FindingCategory::HeaderMissing,
                    Severity::Error,
                    "Required General-Type header not found".to_string(),
                )
                .with_hint(format!(
                    "Expected one of: {} within the first {} rows",
                    schema::ANCHOR_EXACT_PHRASES.join(", "),
                    schema::ROW_SEARCH_CEILING
                )),
            );
        }
    }

    findings.push(Finding::new(
        FindingCategory::Structure,
        Severity::Info,
        format!("{} merged ranges present", doc.merges().len()),
    ));

    ValidationReport::from_findings(findings)
}
