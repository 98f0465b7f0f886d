pub mod error;
pub mod locate;
pub mod runner;
pub mod schema;
pub mod stage;
pub mod stages;
pub mod validator;

pub use error::{
    Finding, FindingCategory, PipelineError, Severity, StageError, ValidationReport,
};
pub use locate::HeaderAnchor;
pub use runner::{PipelineRunner, RunOutcome};
pub use stage::{Stage, StageContext, StageId, StageInput, StageSpec, STAGES};
