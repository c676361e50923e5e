//! Read-only overview of a session.

use finer_core::{SessionDocument, WizardStep};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub current_step: u8,
    pub completed_steps: Vec<u8>,
    pub theme: Option<String>,
    pub rq: Option<String>,
    pub rq_confirmed: bool,
    pub design: Option<String>,
    pub guideline: Option<String>,
    pub literature_done: bool,
    pub data_type_count: usize,
    pub primary_analysis: Option<String>,
    pub has_draft: bool,
}

impl SessionSummary {
    pub fn from_document(doc: &SessionDocument) -> Self {
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        let refined = doc.seed.refined_result.as_ref();

        Self {
            current_step: doc.navigation.current_step,
            completed_steps: doc.navigation.completed_steps.iter().copied().collect(),
            theme: doc.theme().and_then(non_empty),
            rq: refined.and_then(|r| non_empty(&r.rq)),
            rq_confirmed: doc.seed.rq_confirmed,
            design: doc.design_proposal.selected_design.clone(),
            guideline: doc.guideline.selected.clone(),
            literature_done: WizardStep::Literature.is_complete(doc),
            data_type_count: doc.data_collection.types.len(),
            primary_analysis: doc
                .analysis
                .result
                .as_ref()
                .and_then(|r| non_empty(&r.primary_analysis.method)),
            has_draft: WizardStep::Proposal.is_complete(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finer_core::document::{AnalysisResult, RefinedResult, ReviewResult};

    #[test]
    fn test_empty_session() {
        let summary = SessionSummary::from_document(&SessionDocument::default());
        assert_eq!(summary.current_step, 1);
        assert_eq!(summary.theme, None);
        assert_eq!(summary.design, None);
        assert!(!summary.literature_done);
        assert!(!summary.has_draft);
    }

    #[test]
    fn test_filled_session() {
        let mut doc = SessionDocument::default();
        doc.seed.question = "night falls".into();
        doc.seed.refined_result = Some(RefinedResult {
            theme: "Night-time falls".into(),
            rq: "Does hourly rounding reduce falls?".into(),
            ..Default::default()
        });
        doc.literature_review.result = Some(ReviewResult {
            structure: "1. Falls are common".into(),
        });
        doc.data_collection.types.insert("vitals".into());
        doc.analysis.result = Some(AnalysisResult::default());

        let summary = SessionSummary::from_document(&doc);
        assert_eq!(summary.theme.as_deref(), Some("Night-time falls"));
        assert_eq!(summary.rq.as_deref(), Some("Does hourly rounding reduce falls?"));
        assert!(summary.literature_done);
        assert_eq!(summary.data_type_count, 1);
        assert_eq!(summary.primary_analysis, None);
    }
}
