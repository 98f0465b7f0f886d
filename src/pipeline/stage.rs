use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::GridDocument;
use super::error::StageError;
use super::stages;

/// The eight transformation stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageId {
    Unmerge,
    Headers,
    Template,
    Articles,
    Expand,
    Supplement,
    Classify,
    Finalize,
}

impl StageId {
    pub const ALL: [StageId; 8] = [
        StageId::Unmerge,
        StageId::Headers,
        StageId::Template,
        StageId::Articles,
        StageId::Expand,
        StageId::Supplement,
        StageId::Classify,
        StageId::Finalize,
    ];

    pub fn number(self) -> u8 {
        match self {
            StageId::Unmerge => 1,
            StageId::Headers => 2,
            StageId::Template => 3,
            StageId::Articles => 4,
            StageId::Expand => 5,
            StageId::Supplement => 6,
            StageId::Classify => 7,
            StageId::Finalize => 8,
        }
    }

    pub fn from_number(number: u8) -> Option<StageId> {
        StageId::ALL.into_iter().find(|id| id.number() == number)
    }

    pub fn name(self) -> &'static str {
        match self {
            StageId::Unmerge => "unmerge",
            StageId::Headers => "headers",
            StageId::Template => "template",
            StageId::Articles => "articles",
            StageId::Expand => "expand",
            StageId::Supplement => "supplement",
            StageId::Classify => "classify",
            StageId::Finalize => "finalize",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StageId::Unmerge => "Unmerging cells",
            StageId::Headers => "Processing headers",
            StageId::Template => "Creating template",
            StageId::Articles => "Filling article information",
            StageId::Expand => "Transforming data",
            StageId::Supplement => "Processing supplementary data",
            StageId::Classify => "Classifying finished products",
            StageId::Finalize => "Finalizing document",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared input of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageInput {
    /// The unmodified source document.
    Source,
    /// The output of an earlier stage.
    Stage(StageId),
}

/// A stage and its declared inputs. The table below is the dependency
/// graph; the runner refuses selections that are not closed under it.
#[derive(Debug, Clone, Copy)]
pub struct StageSpec {
    pub id: StageId,
    pub requires: &'static [StageInput],
}

pub static STAGES: [StageSpec; 8] = [
    StageSpec {
        id: StageId::Unmerge,
        requires: &[StageInput::Source],
    },
    StageSpec {
        id: StageId::Headers,
        requires: &[StageInput::Stage(StageId::Unmerge)],
    },
    StageSpec {
        id: StageId::Template,
        requires: &[StageInput::Stage(StageId::Headers)],
    },
    StageSpec {
        id: StageId::Articles,
        requires: &[StageInput::Stage(StageId::Template), StageInput::Source],
    },
    StageSpec {
        id: StageId::Expand,
        requires: &[
            StageInput::Stage(StageId::Headers),
            StageInput::Stage(StageId::Articles),
        ],
    },
    StageSpec {
        id: StageId::Supplement,
        requires: &[
            StageInput::Stage(StageId::Headers),
            StageInput::Stage(StageId::Expand),
        ],
    },
    StageSpec {
        id: StageId::Classify,
        requires: &[StageInput::Stage(StageId::Supplement)],
    },
    StageSpec {
        id: StageId::Finalize,
        requires: &[StageInput::Stage(StageId::Classify)],
    },
];

pub fn spec_for(id: StageId) -> &'static StageSpec {
    // The table lists every stage exactly once, in order.
    &STAGES[(id.number() - 1) as usize]
}

/// Check that every dependency appears earlier in the table than its
/// user. Run once at orchestrator construction.
pub fn verify_stage_table() -> Result<(), String> {
    for (idx, spec) in STAGES.iter().enumerate() {
        if spec.id.number() as usize != idx + 1 {
            return Err(format!(
                "stage table out of order at position {idx}: {}",
                spec.id
            ));
        }
        for input in spec.requires {
            if let StageInput::Stage(dep) = input {
                if dep.number() >= spec.id.number() {
                    return Err(format!(
                        "stage '{}' depends on '{dep}', which does not precede it",
                        spec.id
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Inputs available to a running stage: the source document plus the
/// outputs of every stage completed so far in this run.
pub struct StageContext<'a> {
    stage: StageId,
    source: &'a GridDocument,
    artifacts: &'a BTreeMap<StageId, GridDocument>,
}

impl<'a> StageContext<'a> {
    pub fn new(
        stage: StageId,
        source: &'a GridDocument,
        artifacts: &'a BTreeMap<StageId, GridDocument>,
    ) -> Self {
        Self {
            stage,
            source,
            artifacts,
        }
    }

    pub fn source(&self) -> &GridDocument {
        self.source
    }

    pub fn output_of(&self, id: StageId) -> Result<&GridDocument, StageError> {
        self.artifacts.get(&id).ok_or(StageError::MissingDependency {
            stage: self.stage,
            missing: id,
        })
    }
}

/// One pipeline stage. Implementations are stateless; all inputs come
/// through the context and the output is a freshly built document.
pub trait Stage {
    fn id(&self) -> StageId;
    fn run(&self, ctx: &StageContext) -> Result<GridDocument, StageError>;
}

pub fn stage_for(id: StageId) -> Box<dyn Stage> {
    match id {
        StageId::Unmerge => Box::new(stages::unmerge::CellUnmerger),
        StageId::Headers => Box::new(stages::headers::HeaderConsolidator),
        StageId::Template => Box::new(stages::template::TemplateBuilder),
        StageId::Articles => Box::new(stages::articles::ArticleExtractor),
        StageId::Expand => Box::new(stages::expand::RowExpander),
        StageId::Supplement => Box::new(stages::supplement::SupplementaryMerger),
        StageId::Classify => Box::new(stages::classify::ProductClassifier),
        StageId::Finalize => Box::new(stages::finalize::DocumentFinalizer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_dependency_ordered() {
        verify_stage_table().unwrap();
    }

    #[test]
    fn numbers_roundtrip() {
        for id in StageId::ALL {
            assert_eq!(StageId::from_number(id.number()), Some(id));
        }
        assert_eq!(StageId::from_number(0), None);
        assert_eq!(StageId::from_number(9), None);
    }

    #[test]
    fn every_stage_has_an_implementation() {
        for id in StageId::ALL {
            assert_eq!(stage_for(id).id(), id);
        }
    }

    #[test]
    fn missing_dependency_is_reported_with_both_stages() {
        let source = GridDocument::new("Sheet1");
        let artifacts = BTreeMap::new();
        let ctx = StageContext::new(StageId::Expand, &source, &artifacts);
        let err = ctx.output_of(StageId::Articles).unwrap_err();
        assert!(matches!(
            err,
            StageError::MissingDependency {
                stage: StageId::Expand,
                missing: StageId::Articles,
            }
        ));
    }
}
