//! Step 4: literature search queries and background structure.

use crate::context::WizardContext;
use finer_core::document::{ReviewResult, SuggestedQueries};
use finer_core::normalize::{parse_review_result, parse_suggested_queries};
use finer_core::{Result, Slice, StepOutcome};
use finer_interaction::AiTask;
use minijinja::context;
use serde_json::Value;

pub struct LiteratureStep<'a> {
    ctx: &'a WizardContext,
}

impl<'a> LiteratureStep<'a> {
    pub(crate) fn new(ctx: &'a WizardContext) -> Self {
        Self { ctx }
    }

    pub fn set_keywords(&self, keywords: &str) -> Result<()> {
        self.set_text("literatureReview.keywords", keywords)
    }

    pub fn set_years(&self, years: &str) -> Result<()> {
        self.set_text("literatureReview.years", years)
    }

    pub fn set_language(&self, language: &str) -> Result<()> {
        self.set_text("literatureReview.language", language)
    }

    pub fn set_database(&self, database: &str) -> Result<()> {
        self.set_text("literatureReview.database", database)
    }

    fn set_text(&self, path: &str, value: &str) -> Result<()> {
        self.ctx
            .store()
            .set(path, Value::String(value.trim().to_string()))
    }

    /// The search prompt, also offered for pasting into other tools.
    pub fn prompt(&self) -> Result<String> {
        let message = self.ctx.store().read(|doc| {
            let refined = doc.seed.refined_result.clone().unwrap_or_default();
            let review = &doc.literature_review;
            self.ctx.prompts().render(
                "literature",
                context! {
                    theme => refined.display_theme(),
                    rq => &refined.rq,
                    design => doc.design_proposal.selected_design.clone().unwrap_or_default(),
                    keywords => &review.keywords,
                    years => &review.years,
                    language => &review.language,
                    database => &review.database,
                },
            )
        })?;
        Ok(message)
    }

    /// Suggests search keywords and queries.
    ///
    /// An unusable reply yields `Applied(None)` and writes nothing.
    pub async fn suggest_queries(&self) -> Result<StepOutcome<Option<SuggestedQueries>>> {
        let message = self.prompt()?;
        let ticket = self.ctx.sequencer().issue(Slice::LiteratureQueries);
        let request = self.ctx.request(AiTask::LiteratureQueries, message);
        let Some(reply) = self.ctx.complete(&ticket, request).await? else {
            return Ok(StepOutcome::Discarded);
        };

        let Some(queries) = parse_suggested_queries(&reply) else {
            tracing::warn!("[Literature] Query reply had no usable fields");
            return Ok(StepOutcome::Applied(None));
        };
        let stored = queries.clone();
        self.ctx
            .store()
            .mutate("literatureReview.suggestedQueries", |doc| {
                doc.literature_review.suggested_queries = Some(stored);
            })?;
        Ok(StepOutcome::Applied(Some(queries)))
    }

    /// Builds the background structure. Unstructured replies are kept
    /// verbatim.
    pub async fn build_background(&self) -> Result<StepOutcome<ReviewResult>> {
        let message = self.prompt()?;
        let ticket = self.ctx.sequencer().issue(Slice::LiteratureBackground);
        let request = self.ctx.request(AiTask::LiteratureReview, message);
        let Some(reply) = self.ctx.complete(&ticket, request).await? else {
            return Ok(StepOutcome::Discarded);
        };

        let result = parse_review_result(&reply);
        let stored = result.clone();
        self.ctx.store().mutate("literatureReview.result", |doc| {
            doc.literature_review.result = Some(stored);
        })?;
        Ok(StepOutcome::Applied(result))
    }
}
