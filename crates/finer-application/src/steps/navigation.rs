//! Moving between wizard steps.

use crate::context::WizardContext;
use finer_core::document::{FIRST_STEP, LAST_STEP};
use finer_core::{Result, WizardStep};

pub struct Navigator<'a> {
    ctx: &'a WizardContext,
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    pub fn current(&self) -> WizardStep {
        self.ctx.store().read(|doc| {
            WizardStep::from_number(doc.navigation.current_step).unwrap_or(WizardStep::Seed)
        })
    }

    /// Jumps to step `n`. Numbers outside the wizard are ignored.
    ///
    /// Returns whether the step changed.
    pub fn go_to_step(&self, n: u8) -> Result<bool> {
        if !(FIRST_STEP..=LAST_STEP).contains(&n) {
            tracing::debug!("[Navigation] Ignoring step {}", n);
            return Ok(false);
        }
        if self.current().number() == n {
            return Ok(false);
        }
        self.ctx
            .store()
            .mutate("navigation.currentStep", |doc| doc.navigation.current_step = n)?;
        Ok(true)
    }

    /// Marks the current step done and advances unless it is the last.
    ///
    /// Returns the step the wizard is on afterwards.
    pub fn complete_current_step(&self) -> Result<WizardStep> {
        let step = self.current();
        if !self.ctx.store().read(|doc| step.is_complete(doc)) {
            tracing::info!("[Navigation] Leaving step {} incomplete", step.number());
        }
        let next = step.next().unwrap_or(step);
        self.ctx.store().mutate("navigation", |doc| {
            doc.navigation.completed_steps.insert(step.number());
            doc.navigation.current_step = next.number();
        })?;
        Ok(next)
    }

    /// Moves back one step. Returns false on the first step.
    pub fn previous(&self) -> Result<bool> {
        let current = self.current().number();
        if current == FIRST_STEP {
            return Ok(false);
        }
        self.go_to_step(current - 1)
    }

    /// Completion state of every step, in order.
    pub fn checklist(&self) -> Vec<(WizardStep, bool)> {
        use strum::IntoEnumIterator;
        self.ctx.store().read(|doc| {
            WizardStep::iter()
                .map(|step| (step, step.is_complete(doc)))
                .collect()
        })
    }
}
