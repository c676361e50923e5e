//! Step controllers.
//!
//! Each controller borrows the [`WizardContext`](crate::WizardContext),
//! reads its slice of the store, calls the AI when needed and writes the
//! normalized result back. AI actions return [`StepOutcome`] so callers can
//! tell a superseded response from an applied one.
//!
//! [`StepOutcome`]: finer_core::StepOutcome

mod analysis;
mod data_collection;
mod design;
mod guideline;
mod literature;
mod navigation;
mod proposal;
mod seed;

pub use analysis::AnalysisStep;
pub use data_collection::DataCollectionStep;
pub use design::{DesignStep, GeneratedDesign};
pub use guideline::GuidelineStep;
pub use literature::LiteratureStep;
pub use navigation::Navigator;
pub use proposal::ProposalStep;
pub use seed::{AUTO_REFINE_HISTORY_LEN, ChatTurn, SeedStep};
