//! Step 6: analysis plan.

use crate::context::WizardContext;
use finer_core::analysis::{
    AnalysisHint, AnalysisRule, auto_suggestions, parse_analysis_result, rule_for,
};
use finer_core::document::AnalysisResult;
use finer_core::{Result, Slice, StepOutcome};
use finer_interaction::AiTask;
use minijinja::context;

pub struct AnalysisStep<'a> {
    ctx: &'a WizardContext,
}

impl<'a> AnalysisStep<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    /// Rule-table row for the chosen grouping.
    pub fn rule(&self) -> &'static AnalysisRule {
        self.ctx
            .store()
            .read(|doc| rule_for(doc.data_collection.grouping))
    }

    pub fn suggestions(&self) -> Vec<AnalysisHint> {
        self.ctx
            .store()
            .read(|doc| auto_suggestions(&doc.data_collection))
    }

    /// Asks for an analysis plan. Unstructured replies become the reason of
    /// a single primary method.
    pub async fn propose(&self) -> Result<StepOutcome<AnalysisResult>> {
        let message = self.ctx.store().read(|doc| {
            let data = &doc.data_collection;
            let hints: Vec<String> = auto_suggestions(data)
                .iter()
                .map(ToString::to_string)
                .collect();
            self.ctx.prompts().render(
                "analysis",
                context! {
                    design => doc.design_proposal.selected_design.clone().unwrap_or_default(),
                    types => data.types.iter().collect::<Vec<_>>(),
                    sample_size => &data.sample_size,
                    grouping => data.grouping.map(|g| g.to_string()).unwrap_or_default(),
                    hints => hints,
                },
            )
        })?;

        let ticket = self.ctx.sequencer().issue(Slice::Analysis);
        let request = self.ctx.request(AiTask::StatisticsProposal, message);
        let Some(reply) = self.ctx.complete(&ticket, request).await? else {
            return Ok(StepOutcome::Discarded);
        };

        let result = parse_analysis_result(&reply);
        let stored = result.clone();
        self.ctx.store().mutate("analysis.result", |doc| {
            doc.analysis.result = Some(stored);
        })?;
        tracing::info!("[Analysis] Primary method: {}", result.primary_analysis.method);
        Ok(StepOutcome::Applied(result))
    }
}
