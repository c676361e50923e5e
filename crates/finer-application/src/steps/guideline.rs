//! Step 3: reporting guideline and its checklist.

use crate::context::WizardContext;
use finer_core::guideline::{
    DesignType, Guideline, find_guideline_by_name, is_manual_design, recommended_designs,
    resolve_guideline,
};
use finer_core::{FinerError, Result};

pub struct GuidelineStep<'a> {
    ctx: &'a WizardContext,
}

impl<'a> GuidelineStep<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    /// The guideline implied by the selected design, if any.
    pub fn current(&self) -> Option<&'static Guideline> {
        self.ctx.store().read(|doc| {
            doc.guideline
                .selected
                .as_deref()
                .and_then(find_guideline_by_name)
        })
    }

    /// Design types suited to the outline's research category.
    pub fn recommendations(&self) -> Vec<&'static DesignType> {
        self.ctx.store().read(|doc| {
            doc.seed
                .refined_result
                .as_ref()
                .map(|r| recommended_designs(r.research_type))
                .unwrap_or_default()
        })
    }

    /// Selects a design type from the manual table.
    pub fn choose_design_type(&self, label: &str) -> Result<&'static Guideline> {
        let label = label.trim();
        if !is_manual_design(label) {
            return Err(FinerError::invalid_value(
                "designProposal.selectedDesign",
                format!("'{}' is not a known design type", label),
            ));
        }
        self.ctx
            .store()
            .mutate("designProposal.selectedDesign", |doc| {
                doc.design_proposal.selected_design = Some(label.to_string());
            })?;
        Ok(resolve_guideline(label))
    }

    /// Flips one checklist item. Returns whether it is now checked.
    pub fn toggle_checklist_item(&self, index: usize) -> Result<bool> {
        self.check_index("guideline.checklist", index)?;
        let checked = self
            .ctx
            .store()
            .read(|doc| !doc.guideline.checklist.contains(&index));
        self.ctx.store().mutate("guideline.checklist", |doc| {
            if checked {
                doc.guideline.checklist.insert(index);
            } else {
                doc.guideline.checklist.shift_remove(&index);
            }
        })?;
        Ok(checked)
    }

    /// Stores a note for one item. Empty text removes the note.
    pub fn set_note(&self, index: usize, text: &str) -> Result<()> {
        self.check_index("guideline.notes", index)?;
        let text = text.trim().to_string();
        self.ctx.store().mutate("guideline.notes", |doc| {
            if text.is_empty() {
                doc.guideline.notes.remove(&index);
            } else {
                doc.guideline.notes.insert(index, text);
            }
        })
    }

    /// Checked items and total items of the current guideline.
    pub fn progress(&self) -> Option<(usize, usize)> {
        let guideline = self.current()?;
        let checked = self.ctx.store().read(|doc| doc.guideline.checklist.len());
        Some((checked, guideline.checklist.len()))
    }

    fn check_index(&self, path: &str, index: usize) -> Result<()> {
        let guideline = self.current().ok_or_else(|| {
            FinerError::invariant("select a study design before using the checklist")
        })?;
        if index >= guideline.checklist.len() {
            return Err(FinerError::invalid_value(
                path,
                format!(
                    "{} has {} items; index {} is out of range",
                    guideline.name,
                    guideline.checklist.len(),
                    index
                ),
            ));
        }
        Ok(())
    }
}
