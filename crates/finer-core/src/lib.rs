pub mod analysis;
pub mod data_collection;
pub mod document;
pub mod error;
pub mod guideline;
pub mod markdown;
pub mod normalize;
pub mod sequence;
pub mod steps;
pub mod storage;

// Re-export common error type
pub use error::{FinerError, Result};

pub use document::SessionDocument;
pub use normalize::{NormalizedProposals, normalize};
pub use sequence::{RequestSequencer, Slice, StepOutcome};
pub use steps::WizardStep;
