#![allow(dead_code)]

use async_trait::async_trait;
use finer_application::{PersistentStore, WizardContext};
use finer_core::document::{RefinedResult, Settings};
use finer_core::{FinerError, Result};
use finer_infrastructure::MemoryStorage;
use finer_interaction::{AiCompletion, AiGateway, CompletionRequest, DemoDelay, GatewayConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replies in the order they were pushed, each after its own delay.
#[derive(Default)]
pub struct ScriptedAi {
    replies: Mutex<VecDeque<(Duration, Result<String>)>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedAi {
    pub fn push(&self, delay: Duration, reply: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back((delay, Ok(reply.into())));
    }

    pub fn push_error(&self, delay: Duration, error: FinerError) {
        self.replies.lock().unwrap().push_back((delay, Err(error)));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiCompletion for ScriptedAi {
    async fn complete(&self, _settings: &Settings, request: CompletionRequest) -> Result<String> {
        let next = self.replies.lock().unwrap().pop_front();
        self.seen.lock().unwrap().push(request);
        let Some((delay, reply)) = next else {
            return Err(FinerError::ai_request(None, "no scripted reply left"));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

pub fn scripted_context() -> (WizardContext, Arc<ScriptedAi>) {
    let ai = Arc::new(ScriptedAi::default());
    let store = PersistentStore::open(Arc::new(MemoryStorage::new()));
    let ctx = WizardContext::new(store, ai.clone()).unwrap();
    (ctx, ai)
}

pub fn demo_context(storage: MemoryStorage) -> WizardContext {
    let gateway = AiGateway::new(GatewayConfig {
        demo_delay: DemoDelay::NONE,
        ..Default::default()
    });
    let store = PersistentStore::open(Arc::new(storage));
    WizardContext::new(store, Arc::new(gateway)).unwrap()
}

pub fn with_outline(ctx: &WizardContext) {
    ctx.store()
        .mutate("seed.refinedResult", |doc| {
            doc.seed.refined_result = Some(RefinedResult {
                theme: "Discharge support".into(),
                rq: "Does a discharge programme reduce readmission?".into(),
                target: "Inpatients aged 65+".into(),
                goal: "Fewer readmissions".into(),
                ..Default::default()
            });
        })
        .unwrap();
}

pub fn design_json(design: &str) -> String {
    format!(
        r#"{{"proposals": [{{"design": "{}", "vision": "v", "finer": {{}}, "reason": "r"}}]}}"#,
        design
    )
}
