use async_trait::async_trait;
use finer_core::document::{ApiProvider, Settings};
use finer_core::normalize::normalize;
use finer_core::{FinerError, Result};
use finer_interaction::{
    AiCompletion, AiGateway, AiProvider, AiTask, CompletionRequest, DemoDelay, GatewayConfig,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Echoes the task name and counts calls.
#[derive(Default)]
struct EchoProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl AiProvider for EchoProvider {
    fn name(&self) -> &'static str {
        "Echo"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("echo:{}", request.task))
    }
}

fn config() -> GatewayConfig {
    GatewayConfig {
        demo_delay: DemoDelay::NONE,
        ..Default::default()
    }
}

fn live_settings() -> Settings {
    Settings {
        api_key: "test-key".into(),
        api_provider: ApiProvider::Gemini,
        demo_mode: false,
    }
}

#[tokio::test]
async fn demo_mode_answers_every_task_without_a_key() {
    let gateway = AiGateway::new(config());
    let settings = Settings::default();
    assert!(settings.uses_demo());

    let design = gateway
        .complete(
            &settings,
            CompletionRequest::new(AiTask::DesignSelection, "sys", "seed"),
        )
        .await
        .unwrap();
    let proposals = normalize(&design);
    assert!(!proposals.is_fallback());

    let draft = gateway
        .complete(
            &settings,
            CompletionRequest::new(AiTask::ProposalDraft, "sys", "draft"),
        )
        .await
        .unwrap();
    assert!(draft.starts_with("# "));
}

#[tokio::test]
async fn injected_provider_receives_live_calls() {
    let provider = Arc::new(EchoProvider::default());
    let gateway = AiGateway::new(config()).with_provider(provider.clone());

    let reply = gateway
        .complete(
            &live_settings(),
            CompletionRequest::new(AiTask::LiteratureQueries, "sys", "u"),
        )
        .await
        .unwrap();

    assert_eq!(reply, "echo:literature-queries");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_demo_reply_times_out() {
    let gateway = AiGateway::new(GatewayConfig {
        timeout: Duration::from_secs(1),
        demo_delay: DemoDelay {
            min_ms: 5_000,
            max_ms: 5_000,
        },
        ..Default::default()
    });

    let err = gateway
        .complete(
            &Settings::default(),
            CompletionRequest::new(AiTask::SeedChat, "sys", "u"),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err, FinerError::Timeout { seconds: 1 });
}
