//! Step 2: propose a study design and let the user pick one.

use crate::context::WizardContext;
use finer_core::document::Proposal;
use finer_core::{FinerError, Result, Slice, StepOutcome, normalize};
use finer_interaction::AiTask;
use minijinja::context;

/// A freshly generated proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDesign {
    pub proposal: Proposal,
    /// The reply could not be parsed and the proposal holds raw text.
    pub from_fallback: bool,
}

pub struct DesignStep<'a> {
    ctx: &'a WizardContext,
}

impl<'a> DesignStep<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    /// Asks for one design proposal.
    ///
    /// With `alternative`, every design proposed so far is listed in the
    /// prompt so the model is steered elsewhere. Nothing enforces that it
    /// complies. The previous proposal moves to the history and the
    /// selection is cleared.
    pub async fn generate(&self, alternative: bool) -> Result<StepOutcome<GeneratedDesign>> {
        let (refined, previous) = self.ctx.store().read(|doc| {
            let previous: Vec<String> = if alternative {
                doc.design_proposal
                    .known_designs()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            } else {
                Vec::new()
            };
            (doc.seed.refined_result.clone(), previous)
        });
        let refined = refined.ok_or_else(|| {
            FinerError::invariant("a research outline is needed before proposing a design")
        })?;

        let approaches: Vec<&str> = refined.approaches.iter().map(|a| a.name.as_str()).collect();
        let message = self.ctx.prompts().render(
            "design",
            context! {
                theme => refined.display_theme(),
                rq => &refined.rq,
                target => &refined.target,
                goal => &refined.goal,
                approaches => approaches,
                previous => previous,
            },
        )?;

        let ticket = self.ctx.sequencer().issue(Slice::Design);
        let request = self.ctx.request(AiTask::DesignSelection, message);
        let Some(reply) = self.ctx.complete(&ticket, request).await? else {
            return Ok(StepOutcome::Discarded);
        };

        let normalized = normalize(&reply);
        let from_fallback = normalized.is_fallback();
        if from_fallback {
            tracing::warn!("[Design] Reply was not structured; showing raw text");
        }
        let proposal = normalized.primary().clone();

        let stored = proposal.clone();
        self.ctx.store().mutate("designProposal", |doc| {
            let state = &mut doc.design_proposal;
            if let Some(previous) = state.current.take() {
                state.history.push(previous);
            }
            state.current = Some(stored);
            state.selected_design = None;
        })?;
        tracing::info!("[Design] Proposed '{}'", proposal.design);

        Ok(StepOutcome::Applied(GeneratedDesign {
            proposal,
            from_fallback,
        }))
    }

    /// Toggles the selection: choosing the selected label clears it.
    ///
    /// Returns the selection after the call.
    pub fn select(&self, design: &str) -> Result<Option<String>> {
        let design = design.trim();
        let next = self.ctx.store().read(|doc| {
            match doc.design_proposal.selected_design.as_deref() {
                Some(current) if current == design => None,
                _ => Some(design.to_string()),
            }
        });
        let stored = next.clone();
        self.ctx
            .store()
            .mutate("designProposal.selectedDesign", |doc| {
                doc.design_proposal.selected_design = stored;
            })?;
        Ok(next)
    }

    /// Labels the user may select right now, proposals first.
    pub fn selectable(&self) -> Vec<String> {
        self.ctx.store().read(|doc| {
            let mut labels: Vec<String> = doc
                .design_proposal
                .known_designs()
                .into_iter()
                .map(str::to_string)
                .collect();
            for design in finer_core::guideline::DESIGN_TABLE.iter() {
                if !labels.iter().any(|l| l == design.label) {
                    labels.push(design.label.to_string());
                }
            }
            labels
        })
    }
}
