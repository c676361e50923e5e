//! Step 7: the proposal draft.

use crate::context::WizardContext;
use finer_core::markdown::render_html;
use finer_core::{Result, Slice, StepOutcome};
use finer_interaction::AiTask;
use minijinja::context;
use serde_json::Value;

pub struct ProposalStep<'a> {
    ctx: &'a WizardContext,
}

impl<'a> ProposalStep<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    /// Composes every earlier step into one prompt and stores the draft.
    pub async fn generate(&self) -> Result<StepOutcome<String>> {
        let message = self.ctx.store().read(|doc| {
            let refined = doc.seed.refined_result.clone().unwrap_or_default();
            let data = &doc.data_collection;
            let primary = doc
                .analysis
                .result
                .as_ref()
                .map(|r| r.primary_analysis.method.clone())
                .unwrap_or_default();
            self.ctx.prompts().render(
                "proposal",
                context! {
                    theme => refined.display_theme(),
                    rq => &refined.rq,
                    target => &refined.target,
                    goal => &refined.goal,
                    design => doc.design_proposal.selected_design.clone().unwrap_or_default(),
                    guideline => doc.guideline.selected.clone().unwrap_or_default(),
                    background => doc
                        .literature_review
                        .result
                        .as_ref()
                        .map(|r| r.structure.clone())
                        .unwrap_or_default(),
                    types => data.types.iter().collect::<Vec<_>>(),
                    grouping => data.grouping.map(|g| g.to_string()).unwrap_or_default(),
                    sample_size => &data.sample_size,
                    primary_analysis => primary,
                },
            )
        })?;

        let ticket = self.ctx.sequencer().issue(Slice::Proposal);
        let request = self.ctx.request(AiTask::ProposalDraft, message);
        let Some(draft) = self.ctx.complete(&ticket, request).await? else {
            return Ok(StepOutcome::Discarded);
        };

        self.set_draft(&draft)?;
        Ok(StepOutcome::Applied(draft))
    }

    /// Replaces the draft with user-edited text.
    pub fn set_draft(&self, draft: &str) -> Result<()> {
        self.ctx
            .store()
            .set("proposal.draft", Value::String(draft.to_string()))
    }

    pub fn draft(&self) -> String {
        self.ctx.store().read(|doc| doc.proposal.draft.clone())
    }

    /// The draft as simple HTML.
    pub fn render_html(&self) -> String {
        render_html(&self.draft())
    }
}
