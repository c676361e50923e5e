//! The context object handed to every step controller.

use crate::prompts::Prompts;
use crate::steps::{
    AnalysisStep, DataCollectionStep, DesignStep, GuidelineStep, LiteratureStep, Navigator,
    ProposalStep, SeedStep,
};
use crate::store::PersistentStore;
use crate::summary::SessionSummary;
use anyhow::{Context, Result as AnyResult};
use finer_core::sequence::Ticket;
use finer_core::storage::DurableStorage;
use finer_core::{RequestSequencer, Result, Slice};
use finer_infrastructure::{AiConfig, AppConfig, FileStorage};
use finer_interaction::{
    AiCompletion, AiGateway, AiTask, CompletionRequest, DemoDelay, GatewayConfig,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Sampling settings applied to every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestDefaults {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            temperature: finer_interaction::task::DEFAULT_TEMPERATURE,
            max_output_tokens: finer_interaction::task::DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Translates the `[ai]` config table into gateway settings.
pub fn gateway_config(ai: &AiConfig) -> GatewayConfig {
    GatewayConfig {
        timeout: Duration::from_secs(ai.timeout_secs),
        gemini_model: ai.gemini_model.clone(),
        openai_model: ai.openai_model.clone(),
        demo_delay: DemoDelay {
            min_ms: ai.demo_delay_min_ms,
            max_ms: ai.demo_delay_max_ms,
        },
    }
}

/// Everything a step controller needs: the store, the AI capability, the
/// request sequencer and the prompt templates.
pub struct WizardContext {
    store: PersistentStore,
    ai: Arc<dyn AiCompletion>,
    sequencer: RequestSequencer,
    prompts: Prompts,
    defaults: RequestDefaults,
    task_models: HashMap<AiTask, String>,
}

impl WizardContext {
    pub fn new(store: PersistentStore, ai: Arc<dyn AiCompletion>) -> Result<Self> {
        Ok(Self {
            store,
            ai,
            sequencer: RequestSequencer::new(),
            prompts: Prompts::new()?,
            defaults: RequestDefaults::default(),
            task_models: HashMap::new(),
        })
    }

    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sends every `task` request to `model` instead of the provider default.
    pub fn with_task_model(mut self, task: AiTask, model: impl Into<String>) -> Self {
        self.task_models.insert(task, model.into());
        self
    }

    /// Wires file storage and the live gateway from application config.
    pub fn from_config(config: &AppConfig) -> AnyResult<Self> {
        let dir = config
            .storage_dir()
            .context("Failed to resolve storage directory")?;
        tracing::debug!("[Wizard] Using storage at {}", dir.display());

        let storage: Arc<dyn DurableStorage> = Arc::new(FileStorage::new(dir));
        let store = PersistentStore::open(storage);
        let gateway = AiGateway::new(gateway_config(&config.ai));

        let mut ctx = Self::new(store, Arc::new(gateway))
            .context("Failed to prepare prompt templates")?
            .with_defaults(RequestDefaults {
                temperature: config.ai.temperature,
                max_output_tokens: config.ai.max_output_tokens,
            });
        for (name, model) in &config.ai.task_models {
            let task = AiTask::from_str(name)
                .with_context(|| format!("Unknown task '{}' in [ai.task_models]", name))?;
            ctx = ctx.with_task_model(task, model);
        }
        Ok(ctx)
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    pub(crate) fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Whether an AI call for `slice` is in flight.
    pub fn is_busy(&self, slice: Slice) -> bool {
        self.sequencer.is_busy(slice)
    }

    pub(crate) fn request(&self, task: AiTask, user_message: String) -> CompletionRequest {
        let request = CompletionRequest::new(task, self.prompts.system(task), user_message)
            .with_temperature(self.defaults.temperature)
            .with_max_output_tokens(self.defaults.max_output_tokens);
        match self.task_models.get(&task) {
            Some(model) => request.with_model(model),
            None => request,
        }
    }

    /// Sends `request` with the current settings on behalf of `ticket`.
    ///
    /// Yields `None` when a newer request for the same slice was issued
    /// meanwhile, whether this call succeeded or failed.
    pub(crate) async fn complete(
        &self,
        ticket: &Ticket,
        request: CompletionRequest,
    ) -> Result<Option<String>> {
        let settings = self.store.settings();
        let reply = self.ai.complete(&settings, request).await;
        if self.is_stale(ticket) {
            if let Err(e) = &reply {
                tracing::debug!("[Wizard] Dropping error from superseded request: {}", e);
            }
            return Ok(None);
        }
        reply.map(Some)
    }

    fn is_stale(&self, ticket: &Ticket) -> bool {
        let stale = !ticket.is_current();
        if stale {
            tracing::debug!(
                "[Wizard] Discarding stale {} response #{}",
                ticket.slice(),
                ticket.seq()
            );
        }
        stale
    }

    pub fn seed(&self) -> SeedStep<'_> {
        SeedStep::new(self)
    }

    pub fn design(&self) -> DesignStep<'_> {
        DesignStep::new(self)
    }

    pub fn guideline(&self) -> GuidelineStep<'_> {
        GuidelineStep::new(self)
    }

    pub fn literature(&self) -> LiteratureStep<'_> {
        LiteratureStep::new(self)
    }

    pub fn data_collection(&self) -> DataCollectionStep<'_> {
        DataCollectionStep::new(self)
    }

    pub fn analysis(&self) -> AnalysisStep<'_> {
        AnalysisStep::new(self)
    }

    pub fn proposal(&self) -> ProposalStep<'_> {
        ProposalStep::new(self)
    }

    pub fn navigation(&self) -> Navigator<'_> {
        Navigator::new(self)
    }

    pub fn summary(&self) -> SessionSummary {
        self.store.read(SessionSummary::from_document)
    }
}
