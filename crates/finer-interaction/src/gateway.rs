//! AI Gateway: routes a request to demo responses or a live provider.

use crate::demo::{DemoDelay, DemoResponder};
use crate::gemini_api_provider::{DEFAULT_GEMINI_MODEL, GeminiApiProvider};
use crate::openai_api_provider::{DEFAULT_OPENAI_MODEL, OpenAiApiProvider};
use crate::provider::AiProvider;
use crate::task::CompletionRequest;
use async_trait::async_trait;
use finer_core::document::{ApiProvider, Settings};
use finer_core::{FinerError, Result};
use std::sync::Arc;
use std::time::Duration;

/// The completion capability step controllers depend on.
#[async_trait]
pub trait AiCompletion: Send + Sync {
    /// Returns generated text, or fails with `AiRequest`/`Timeout`.
    /// Never returns an empty string on failure.
    async fn complete(&self, settings: &Settings, request: CompletionRequest) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub timeout: Duration,
    pub gemini_model: String,
    pub openai_model: String,
    pub demo_delay: DemoDelay,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            demo_delay: DemoDelay::default(),
        }
    }
}

pub struct AiGateway {
    config: GatewayConfig,
    demo: DemoResponder,
    /// Replaces settings-based provider selection when set.
    provider_override: Option<Arc<dyn AiProvider>>,
}

impl AiGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let demo = DemoResponder::new(config.demo_delay);
        Self {
            config,
            demo,
            provider_override: None,
        }
    }

    /// Routes every live call to `provider` regardless of settings.
    pub fn with_provider(mut self, provider: Arc<dyn AiProvider>) -> Self {
        self.provider_override = Some(provider);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn provider_for(&self, settings: &Settings) -> Arc<dyn AiProvider> {
        if let Some(provider) = &self.provider_override {
            return provider.clone();
        }
        match settings.api_provider {
            ApiProvider::Gemini => Arc::new(
                GeminiApiProvider::new(settings.api_key.trim())
                    .with_model(&self.config.gemini_model),
            ),
            ApiProvider::Openai => Arc::new(
                OpenAiApiProvider::new(settings.api_key.trim())
                    .with_model(&self.config.openai_model),
            ),
        }
    }

    async fn dispatch(&self, settings: &Settings, request: &CompletionRequest) -> Result<String> {
        if settings.uses_demo() && self.provider_override.is_none() {
            tracing::debug!("[Gateway] Demo response for {}", request.task);
            return Ok(self.demo.respond(request).await);
        }

        let provider = self.provider_for(settings);
        tracing::info!(
            "[Gateway] {} request via {} (structured: {})",
            request.task,
            provider.name(),
            request.structured_output()
        );
        provider.complete(request).await
    }
}

#[async_trait]
impl AiCompletion for AiGateway {
    async fn complete(&self, settings: &Settings, request: CompletionRequest) -> Result<String> {
        let seconds = self.config.timeout.as_secs();
        match tokio::time::timeout(self.config.timeout, self.dispatch(settings, &request)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                tracing::warn!("[Gateway] {} failed: {}", request.task, e);
                Err(e)
            }
            Err(_) => {
                tracing::warn!("[Gateway] {} timed out after {}s", request.task, seconds);
                Err(FinerError::Timeout { seconds })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::AiTask;

    struct SlowProvider;

    #[async_trait]
    impl AiProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "Slow"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok("late".into())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl AiProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "Failing"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Err(FinerError::ai_request(Some(500), "boom"))
        }
    }

    fn demo_config() -> GatewayConfig {
        GatewayConfig {
            demo_delay: DemoDelay::NONE,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_demo_when_no_key() {
        let gateway = AiGateway::new(demo_config());
        let settings = Settings {
            demo_mode: false,
            ..Default::default()
        };
        let reply = gateway
            .complete(&settings, CompletionRequest::new(AiTask::RefineSeed, "s", "u"))
            .await
            .unwrap();
        assert!(reply.contains("\"rq\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let gateway = AiGateway::new(GatewayConfig {
            timeout: Duration::from_secs(5),
            ..demo_config()
        })
        .with_provider(Arc::new(SlowProvider));

        let err = gateway
            .complete(
                &Settings::default(),
                CompletionRequest::new(AiTask::SeedChat, "s", "u"),
            )
            .await
            .unwrap_err();
        assert_eq!(err, FinerError::Timeout { seconds: 5 });
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let gateway = AiGateway::new(demo_config()).with_provider(Arc::new(FailingProvider));
        let err = gateway
            .complete(
                &Settings::default(),
                CompletionRequest::new(AiTask::ProposalDraft, "s", "u"),
            )
            .await
            .unwrap_err();
        assert!(err.is_ai_failure());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_provider_selection_follows_settings() {
        let gateway = AiGateway::new(demo_config());
        let settings = Settings {
            api_key: "k".into(),
            api_provider: ApiProvider::Openai,
            demo_mode: false,
        };
        assert_eq!(gateway.provider_for(&settings).name(), "OpenAI");
    }
}
