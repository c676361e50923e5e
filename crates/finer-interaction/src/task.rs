//! AI task identifiers and the request contract.

use finer_core::document::ChatMessage;
use strum::{Display, EnumIter, EnumString};

/// What a completion is for. Selects demo responses and the
/// structured-output flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum AiTask {
    /// Free-form brainstorming turn on the research seed
    SeedChat,
    /// Distil the chat into a research outline (JSON)
    RefineSeed,
    /// Propose a study design (JSON)
    DesignSelection,
    /// Suggest literature search queries (JSON)
    LiteratureQueries,
    /// Build the literature background (JSON)
    LiteratureReview,
    /// Propose an analysis plan (JSON)
    StatisticsProposal,
    /// Write the proposal draft (markdown)
    ProposalDraft,
}

impl AiTask {
    /// Whether the reply is expected to be machine-parseable JSON.
    pub fn expects_structured_output(self) -> bool {
        matches!(
            self,
            Self::RefineSeed
                | Self::DesignSelection
                | Self::LiteratureQueries
                | Self::LiteratureReview
                | Self::StatisticsProposal
        )
    }
}

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Prior turns, oldest first. Excludes the current user message.
    pub history: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Overrides the provider's configured model.
    pub model: Option<String>,
    /// Overrides the task's structured-output default.
    pub structured_output: Option<bool>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            model: None,
            structured_output: None,
        }
    }
}

/// One call to the AI Gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub task: AiTask,
    pub system_instruction: String,
    pub user_message: String,
    pub options: CompletionOptions,
}

impl CompletionRequest {
    pub fn new(
        task: AiTask,
        system_instruction: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            task,
            system_instruction: system_instruction.into(),
            user_message: user_message.into(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.options.history = history;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.options.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.options.model = Some(model.into());
        self
    }

    /// Whether the backend should be asked to constrain output to JSON.
    pub fn structured_output(&self) -> bool {
        self.options
            .structured_output
            .unwrap_or_else(|| self.task.expects_structured_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_defaults_per_task() {
        assert!(!CompletionRequest::new(AiTask::SeedChat, "s", "u").structured_output());
        assert!(!CompletionRequest::new(AiTask::ProposalDraft, "s", "u").structured_output());
        assert!(CompletionRequest::new(AiTask::DesignSelection, "s", "u").structured_output());
    }

    #[test]
    fn test_structured_override() {
        let mut req = CompletionRequest::new(AiTask::RefineSeed, "s", "u");
        req.options.structured_output = Some(false);
        assert!(!req.structured_output());
    }

    #[test]
    fn test_defaults() {
        let req = CompletionRequest::new(AiTask::SeedChat, "s", "u");
        assert_eq!(req.options.temperature, 0.7);
        assert_eq!(req.options.max_output_tokens, 4096);
        assert_eq!(AiTask::StatisticsProposal.to_string(), "statistics-proposal");
    }
}
