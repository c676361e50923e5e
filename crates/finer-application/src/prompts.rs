//! Prompt templates for each AI task.
//!
//! System instructions are fixed text. User messages are minijinja
//! templates rendered from the document slices a step reads.

use finer_core::{FinerError, Result};
use finer_interaction::AiTask;
use minijinja::Environment;
use serde::Serialize;

const SEED_CHAT_SYSTEM: &str = "You are a friendly research advisor for clinicians. \
The user shares a research seed, an everyday clinical question. Ask a few focused \
questions at a time about population, intervention, comparison, outcome and setting. \
Keep answers short and encouraging, and use markdown lists.";

const REFINE_SYSTEM: &str = "Summarise the conversation into a research outline. \
Choose the best category among research, practice and qi. Reply with JSON only:\n\
{\"type\": \"research\" | \"practice\" | \"qi\", \"theme\": \"noun phrase\", \
\"rq\": \"the research question, phrased as a question\", \"target\": \"population\", \
\"goal\": \"core aim\", \"approaches\": [{\"name\": \"...\", \"description\": \"...\"}]}";

const DESIGN_SYSTEM: &str = "You are a research methodologist. Propose exactly one study \
design for the outline. Reply with JSON only:\n\
{\"proposals\": [{\"design\": \"design label\", \"vision\": \"what the study would look like\", \
\"finer\": {\"feasible\": \"...\", \"interesting\": \"...\", \"novel\": \"...\", \
\"ethical\": \"...\", \"relevant\": \"...\"}, \"reason\": \"why this design fits\"}]}";

const LITERATURE_QUERIES_SYSTEM: &str = "You are a medical librarian. Suggest search \
keywords and database queries. Reply with JSON only:\n\
{\"keywordsNative\": \"...\", \"keywordsForeign\": \"...\", \"queryNative\": \"...\", \
\"queryForeign\": \"...\"}";

const LITERATURE_REVIEW_SYSTEM: &str = "You are a research supervisor. Outline the \
background and significance of the study as a numbered argument structure. \
Reply with JSON only: {\"structure\": \"...\"}";

const STATISTICS_SYSTEM: &str = "You are a biostatistician. Propose an analysis plan. \
Reply with JSON only:\n\
{\"primaryAnalysis\": {\"method\": \"...\", \"reason\": \"...\"}, \
\"secondaryAnalyses\": [{\"method\": \"...\", \"reason\": \"...\"}], \
\"effectSize\": \"...\", \"multivariateNeeded\": true, \"multivariateMethod\": \"...\", \
\"sampleSizeNote\": \"...\"}";

const PROPOSAL_SYSTEM: &str = "You are an experienced grant writer. Write a research \
proposal draft in markdown with sections for background, research question, methods, \
analysis and ethics. Use only the material provided.";

const REFINE_TEMPLATE: &str = "\
Research seed: {{ question }}

Conversation:
{% for turn in history %}{{ turn.role }}: {{ turn.content }}
{% endfor %}";

const DESIGN_TEMPLATE: &str = "\
Theme: {{ theme }}
Research question: {{ rq }}
Population: {{ target }}
Goal: {{ goal }}
Approaches: {{ approaches | join(\", \") }}
{%- if previous %}

These designs have already been proposed. Suggest a design with a different perspective or methodology:
{% for design in previous %}{{ loop.index }}. {{ design }}
{% endfor %}
{%- endif %}";

const LITERATURE_TEMPLATE: &str = "\
Theme: {{ theme }}
Research question: {{ rq }}
Study design: {{ design or \"undecided\" }}
Keywords: {{ keywords or \"none given\" }}
Publication window: last {{ years }} years
Languages: {{ language }}
Database: {{ database }}";

const ANALYSIS_TEMPLATE: &str = "\
Study design: {{ design or \"undecided\" }}
Data types: {{ types | join(\", \") if types else \"undecided\" }}
Sample size: {{ sample_size or \"undecided\" }}
Grouping: {{ grouping or \"undecided\" }}
{%- if hints %}

Rule-based hints:
{% for hint in hints %}- {{ hint }}
{% endfor %}
{%- endif %}";

const PROPOSAL_TEMPLATE: &str = "\
Theme: {{ theme }}
Research question: {{ rq }}
Population: {{ target }}
Goal: {{ goal }}
Study design: {{ design or \"undecided\" }}
Reporting guideline: {{ guideline or \"undecided\" }}
{%- if background %}

Background structure:
{{ background }}
{%- endif %}

Data collection: {{ types | join(\", \") if types else \"undecided\" }}; grouping {{ grouping or \"undecided\" }}; sample size {{ sample_size or \"undecided\" }}
{%- if primary_analysis %}
Primary analysis: {{ primary_analysis }}
{%- endif %}";

/// Compiled templates, built once per context.
pub struct Prompts {
    env: Environment<'static>,
}

impl Prompts {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        let templates = [
            ("refine", REFINE_TEMPLATE),
            ("design", DESIGN_TEMPLATE),
            ("literature", LITERATURE_TEMPLATE),
            ("analysis", ANALYSIS_TEMPLATE),
            ("proposal", PROPOSAL_TEMPLATE),
        ];
        for (name, source) in templates {
            env.add_template(name, source)
                .map_err(|e| FinerError::internal(format!("template {}: {}", name, e)))?;
        }
        Ok(Self { env })
    }

    /// Fixed system instruction for `task`.
    pub fn system(&self, task: AiTask) -> &'static str {
        match task {
            AiTask::SeedChat => SEED_CHAT_SYSTEM,
            AiTask::RefineSeed => REFINE_SYSTEM,
            AiTask::DesignSelection => DESIGN_SYSTEM,
            AiTask::LiteratureQueries => LITERATURE_QUERIES_SYSTEM,
            AiTask::LiteratureReview => LITERATURE_REVIEW_SYSTEM,
            AiTask::StatisticsProposal => STATISTICS_SYSTEM,
            AiTask::ProposalDraft => PROPOSAL_SYSTEM,
        }
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .map(|text| text.trim().to_string())
            .map_err(|e| FinerError::internal(format!("render {}: {}", name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_design_prompt_lists_previous_designs() {
        let prompts = Prompts::new().unwrap();
        let text = prompts
            .render(
                "design",
                context! {
                    theme => "Discharge support",
                    rq => "Does it help?",
                    target => "Older inpatients",
                    goal => "Fewer readmissions",
                    approaches => vec!["Checklist", "Follow-up call"],
                    previous => vec!["Interventional study", "Observational study"],
                },
            )
            .unwrap();
        assert!(text.contains("Approaches: Checklist, Follow-up call"));
        assert!(text.contains("1. Interventional study"));
        assert!(text.contains("2. Observational study"));
    }

    #[test]
    fn test_design_prompt_without_previous() {
        let prompts = Prompts::new().unwrap();
        let empty: Vec<String> = Vec::new();
        let text = prompts
            .render(
                "design",
                context! { theme => "t", rq => "r", target => "p", goal => "g",
                           approaches => empty.clone(), previous => empty },
            )
            .unwrap();
        assert!(!text.contains("already been proposed"));
    }

    #[test]
    fn test_analysis_prompt_defaults() {
        let prompts = Prompts::new().unwrap();
        let empty: Vec<String> = Vec::new();
        let text = prompts
            .render(
                "analysis",
                context! { design => "", types => empty.clone(), sample_size => "",
                           grouping => "", hints => empty },
            )
            .unwrap();
        assert!(text.contains("Data types: undecided"));
        assert!(text.contains("Sample size: undecided"));
    }

    #[test]
    fn test_every_task_has_a_system_instruction() {
        use strum::IntoEnumIterator;
        let prompts = Prompts::new().unwrap();
        for task in AiTask::iter() {
            assert!(!prompts.system(task).is_empty());
        }
    }
}
