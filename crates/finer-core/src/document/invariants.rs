//! Document invariants and the derived guideline cache.
//!
//! Writes are checked and rejected; loads and imports are repaired, since a
//! saved blob may predate a rule or come from another machine.

use super::model::{FIRST_STEP, LAST_STEP, SessionDocument};
use crate::error::{FinerError, Result};
use crate::guideline::{is_manual_design, resolve_guideline};

fn step_in_range(step: u8) -> bool {
    (FIRST_STEP..=LAST_STEP).contains(&step)
}

impl SessionDocument {
    /// Whether `label` may be stored as `designProposal.selectedDesign`.
    pub fn is_selectable_design(&self, label: &str) -> bool {
        is_manual_design(label)
            || self
                .design_proposal
                .known_designs()
                .iter()
                .any(|d| *d == label)
    }

    /// Fails on the first broken invariant.
    pub fn check_invariants(&self) -> Result<()> {
        let nav = &self.navigation;
        if !step_in_range(nav.current_step) {
            return Err(FinerError::invariant(format!(
                "currentStep {} is outside {}..={}",
                nav.current_step, FIRST_STEP, LAST_STEP
            )));
        }
        if let Some(bad) = nav.completed_steps.iter().find(|s| !step_in_range(**s)) {
            return Err(FinerError::invariant(format!(
                "completedSteps contains {}",
                bad
            )));
        }
        if self.seed.rq_confirmed && self.seed.refined_result.is_none() {
            return Err(FinerError::invariant(
                "rqConfirmed requires a refinedResult",
            ));
        }
        if let Some(selected) = &self.design_proposal.selected_design {
            if !self.is_selectable_design(selected) {
                return Err(FinerError::invariant(format!(
                    "selectedDesign '{}' is neither a proposed nor a manual design",
                    selected
                )));
            }
        }
        Ok(())
    }

    /// Brings a loaded document back within its invariants.
    ///
    /// Returns a description of each repair made, for logging.
    pub fn repair_invariants(&mut self) -> Vec<String> {
        let mut repairs = Vec::new();

        let nav = &mut self.navigation;
        if !step_in_range(nav.current_step) {
            let clamped = nav.current_step.clamp(FIRST_STEP, LAST_STEP);
            repairs.push(format!(
                "currentStep {} clamped to {}",
                nav.current_step, clamped
            ));
            nav.current_step = clamped;
        }
        let before = nav.completed_steps.len();
        nav.completed_steps.retain(|s| step_in_range(*s));
        if nav.completed_steps.len() != before {
            repairs.push("out-of-range completedSteps dropped".to_string());
        }

        if self.seed.rq_confirmed && self.seed.refined_result.is_none() {
            self.seed.rq_confirmed = false;
            repairs.push("rqConfirmed reset without refinedResult".to_string());
        }

        let orphaned = self
            .design_proposal
            .selected_design
            .as_deref()
            .filter(|d| !self.is_selectable_design(d))
            .map(str::to_string);
        if let Some(design) = orphaned {
            self.design_proposal.selected_design = None;
            repairs.push(format!("orphaned selectedDesign '{}' cleared", design));
        }

        repairs
    }

    /// The guideline name implied by the current selection.
    pub fn derived_guideline(&self) -> Option<&'static str> {
        self.design_proposal
            .selected_design
            .as_deref()
            .map(|d| resolve_guideline(d).name)
    }

    /// Recomputes `guideline.selected` from `selectedDesign`.
    ///
    /// Checklist indices belong to one guideline, so they are cleared when
    /// the resolved guideline changes. Returns true when it changed.
    pub fn sync_derived(&mut self) -> bool {
        let derived = self.derived_guideline().map(str::to_string);
        if derived == self.guideline.selected {
            return false;
        }
        self.guideline.selected = derived;
        self.guideline.checklist.clear();
        self.guideline.notes.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Proposal, RefinedResult};

    fn with_proposal(design: &str) -> SessionDocument {
        let mut doc = SessionDocument::default();
        doc.design_proposal.current = Some(Proposal {
            design: design.to_string(),
            ..Default::default()
        });
        doc
    }

    #[test]
    fn test_default_document_is_valid() {
        assert!(SessionDocument::default().check_invariants().is_ok());
    }

    #[test]
    fn test_step_out_of_range() {
        let mut doc = SessionDocument::default();
        doc.navigation.current_step = 8;
        assert!(doc.check_invariants().is_err());
        doc.navigation.current_step = 0;
        assert!(doc.check_invariants().is_err());

        let repairs = doc.repair_invariants();
        assert_eq!(doc.navigation.current_step, 1);
        assert_eq!(repairs.len(), 1);
    }

    #[test]
    fn test_confirmed_requires_refined() {
        let mut doc = SessionDocument::default();
        doc.seed.rq_confirmed = true;
        assert!(doc.check_invariants().is_err());

        doc.seed.refined_result = Some(RefinedResult::default());
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_selected_design_sources() {
        let mut doc = with_proposal("Stepped-wedge cluster trial");
        doc.design_proposal.selected_design = Some("Stepped-wedge cluster trial".into());
        assert!(doc.check_invariants().is_ok());

        doc.design_proposal.selected_design = Some("Scoping review".into());
        assert!(doc.check_invariants().is_ok());

        doc.design_proposal.selected_design = Some("Something stale".into());
        assert!(doc.check_invariants().is_err());
    }

    #[test]
    fn test_history_designs_are_selectable() {
        let mut doc = with_proposal("New");
        doc.design_proposal.history.push(Proposal {
            design: "Old".into(),
            ..Default::default()
        });
        doc.design_proposal.selected_design = Some("Old".into());
        assert!(doc.check_invariants().is_ok());
    }

    #[test]
    fn test_repair_clears_orphan() {
        let mut doc = SessionDocument::default();
        doc.design_proposal.selected_design = Some("Ghost".into());
        let repairs = doc.repair_invariants();
        assert!(doc.design_proposal.selected_design.is_none());
        assert!(repairs[0].contains("Ghost"));
    }

    #[test]
    fn test_sync_derived_clears_checklist_on_change() {
        let mut doc = SessionDocument::default();
        doc.design_proposal.selected_design = Some("Interventional study".into());
        assert!(doc.sync_derived());
        assert_eq!(doc.guideline.selected.as_deref(), Some("CONSORT"));

        doc.guideline.checklist.insert(4);
        assert!(!doc.sync_derived());
        assert!(doc.guideline.checklist.contains(&4));

        doc.design_proposal.selected_design = Some("Qualitative study".into());
        assert!(doc.sync_derived());
        assert_eq!(doc.guideline.selected.as_deref(), Some("COREQ"));
        assert!(doc.guideline.checklist.is_empty());

        doc.design_proposal.selected_design = None;
        assert!(doc.sync_derived());
        assert!(doc.guideline.selected.is_none());
    }
}
