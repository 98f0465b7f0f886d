use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::GridError;
use super::stage::StageId;

/// What part of the source a pre-flight finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingCategory {
    File,
    Structure,
    HeaderMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One pre-flight observation with a remediation hint for the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub category: FindingCategory,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Finding {
    pub fn new(
        category: FindingCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let passed = !findings.iter().any(|f| f.severity == Severity::Error);
        Self { passed, findings }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Document error: {0}")]
    Grid(#[from] GridError),

    #[error(
        "General-Type header not found in the first {searched_rows} rows — \
         check that the sheet contains a 'General Type/Sub-Type in Connect' header"
    )]
    AnchorNotFound { searched_rows: u32 },

    #[error("Stage '{stage}' requires the output of '{missing}', which has not run")]
    MissingDependency { stage: StageId, missing: StageId },

    #[error(
        "Marker '{marker}' not found in column A — the sheet has no \
         supplementary requirements section"
    )]
    MarkerNotFound { marker: &'static str },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pre-flight validation failed: {0}")]
    Validation(String),

    #[error("Stage {number} ({name}) failed: {source}")]
    Stage {
        number: u8,
        name: &'static str,
        #[source]
        source: StageError,
    },

    #[error("Document error: {0}")]
    Grid(#[from] GridError),

    #[error(
        "Stage selection is not dependency-closed: stage '{stage}' needs '{missing}' \
         and no artifact for it exists"
    )]
    UnsatisfiedSelection { stage: StageId, missing: StageId },

    #[error("Unknown stage number {0}; valid stages are 1 through 8")]
    UnknownStage(u8),

    #[error("Stage selection is empty")]
    EmptySelection,

    #[error("Stage table invariant violated: {0}")]
    StageTable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_fails_only_on_error_severity() {
        let warn = Finding::new(FindingCategory::Structure, Severity::Warning, "thin sheet");
        assert!(ValidationReport::from_findings(vec![warn.clone()]).passed);

        let err = Finding::new(FindingCategory::File, Severity::Error, "missing file")
            .with_hint("check the path");
        let report = ValidationReport::from_findings(vec![warn, err]);
        assert!(!report.passed);
        assert_eq!(report.errors().count(), 1);
    }
}
