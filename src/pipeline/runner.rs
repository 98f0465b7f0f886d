use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::grid::{DocumentStore, GridDocument};
use super::error::{PipelineError, ValidationReport};
use super::stage::{spec_for, stage_for, verify_stage_table, StageContext, StageId, StageInput};
use super::validator;

/// Result of one conversion run. `final_output` is the artifact of the
/// last stage executed; `artifacts` maps every executed stage to its
/// persisted output.
#[derive(Debug)]
pub struct RunOutcome {
    pub final_output: PathBuf,
    pub artifacts: BTreeMap<StageId, PathBuf>,
}

/// Sequential orchestrator. Owns all intermediate artifacts for one run:
/// each stage output is kept in memory for downstream stages and
/// persisted through the store for diagnosis and resumption.
pub struct PipelineRunner<S> {
    store: S,
}

impl<S: DocumentStore> PipelineRunner<S> {
    /// The stage table is checked once here, so a malformed dependency
    /// graph fails at construction instead of mid-run.
    pub fn new(store: S) -> Result<Self, PipelineError> {
        verify_stage_table().map_err(PipelineError::StageTable)?;
        Ok(Self { store })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn validate(&self, source_path: &Path) -> ValidationReport {
        validator::validate(&self.store, source_path)
    }

    /// Run the full eight-stage pipeline.
    pub fn run(&self, source_path: &Path) -> Result<RunOutcome, PipelineError> {
        self.run_stages(source_path, &StageId::ALL, &mut |_, _, _| {})
    }

    /// Run a subset of stages. The selection must be dependency-closed:
    /// any input stage outside the selection is loaded from its persisted
    /// artifact of an earlier run, and its absence is an error before any
    /// stage executes. The progress callback fires synchronously after
    /// each completed stage with (completed, total, display name).
    pub fn run_stages(
        &self,
        source_path: &Path,
        selection: &[StageId],
        progress: &mut dyn FnMut(usize, usize, &str),
    ) -> Result<RunOutcome, PipelineError> {
        let mut selection: Vec<StageId> = selection.to_vec();
        selection.sort_by_key(|id| id.number());
        selection.dedup();
        if selection.is_empty() {
            return Err(PipelineError::EmptySelection);
        }

        let report = self.validate(source_path);
        if !report.passed {
            let summary = report
                .errors()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(PipelineError::Validation(summary));
        }

        let source = self.store.load(source_path)?;
        let mut artifacts = self.seed_missing_dependencies(source_path, &selection)?;

        let total = selection.len();
        let mut artifact_paths = BTreeMap::new();

        for (idx, id) in selection.iter().copied().enumerate() {
            tracing::info!(stage = %id, number = id.number(), "Running stage");

            let ctx = StageContext::new(id, &source, &artifacts);
            let output = stage_for(id).run(&ctx).map_err(|err| PipelineError::Stage {
                number: id.number(),
                name: id.name(),
                source: err,
            })?;

            let path = self.store.artifact_path(source_path, id.number());
            self.store.save(&output, &path)?;
            tracing::info!(stage = %id, path = %path.display(), "Stage artifact persisted");

            artifacts.insert(id, output);
            artifact_paths.insert(id, path);
            progress(idx + 1, total, id.display_name());
        }

        // selection is non-empty, so a last element and its path exist
        let last = *selection.last().unwrap_or(&StageId::Finalize);
        let final_output = artifact_paths
            .get(&last)
            .cloned()
            .unwrap_or_else(|| self.store.artifact_path(source_path, last.number()));

        Ok(RunOutcome {
            final_output,
            artifacts: artifact_paths,
        })
    }

    /// For every declared stage input outside the selection, load its
    /// persisted artifact from an earlier run, or refuse the selection.
    fn seed_missing_dependencies(
        &self,
        source_path: &Path,
        selection: &[StageId],
    ) -> Result<BTreeMap<StageId, GridDocument>, PipelineError> {
        let mut artifacts = BTreeMap::new();
        for id in selection {
            for input in spec_for(*id).requires {
                let StageInput::Stage(dep) = input else {
                    continue;
                };
                if selection.contains(dep) || artifacts.contains_key(dep) {
                    continue;
                }
                let path = self.store.artifact_path(source_path, dep.number());
                match self.store.load(&path) {
                    Ok(doc) => {
                        tracing::info!(
                            stage = %dep,
                            path = %path.display(),
                            "Loaded dependency from persisted artifact"
                        );
                        artifacts.insert(*dep, doc);
                    }
                    Err(_) => {
                        return Err(PipelineError::UnsatisfiedSelection {
                            stage: *id,
                            missing: *dep,
                        })
                    }
                }
            }
        }
        Ok(artifacts)
    }
}
