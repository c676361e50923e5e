//! The seven wizard steps and their completion predicates.

use crate::document::{LAST_STEP, SessionDocument};
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum WizardStep {
    #[strum(serialize = "Research seed")]
    Seed = 1,
    #[strum(serialize = "Study design")]
    Design = 2,
    #[strum(serialize = "Reporting guideline")]
    Guideline = 3,
    #[strum(serialize = "Literature background")]
    Literature = 4,
    #[strum(serialize = "Data collection")]
    DataCollection = 5,
    #[strum(serialize = "Analysis plan")]
    Analysis = 6,
    #[strum(serialize = "Proposal draft")]
    Proposal = 7,
}

impl WizardStep {
    pub fn from_number(n: u8) -> Option<Self> {
        Self::iter().find(|s| s.number() == n)
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn is_last(self) -> bool {
        self.number() == LAST_STEP
    }

    /// Whether the document holds what this step must produce.
    pub fn is_complete(self, doc: &SessionDocument) -> bool {
        match self {
            Self::Seed => doc.seed.refined_result.is_some() && doc.seed.rq_confirmed,
            Self::Design => doc.design_proposal.selected_design.is_some(),
            Self::Guideline => doc.guideline.selected.is_some(),
            Self::Literature => doc.literature_review.result.is_some(),
            Self::DataCollection => {
                !doc.data_collection.types.is_empty() && doc.data_collection.grouping.is_some()
            }
            Self::Analysis => doc.analysis.result.is_some(),
            Self::Proposal => !doc.proposal.draft.trim().is_empty(),
        }
    }
}
