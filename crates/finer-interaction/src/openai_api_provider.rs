//! OpenAiApiProvider - direct REST client for the Chat Completions API.

use crate::http_error::{map_http_error, map_transport_error, parse_retry_after};
use crate::provider::AiProvider;
use crate::task::CompletionRequest;
use async_trait::async_trait;
use finer_core::document::ChatRole;
use finer_core::{FinerError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "OpenAI";

#[derive(Clone)]
pub struct OpenAiApiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiApiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl AiProvider for OpenAiApiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let model = request.options.model.as_deref().unwrap_or(&self.model);
        let body = build_request(request, model);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| map_transport_error(PROVIDER, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(PROVIDER, status, body_text, retry_after));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            FinerError::ai_request(None, format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// System message first, then history, then the current user message.
fn build_request<'a>(request: &'a CompletionRequest, model: &'a str) -> ChatCompletionRequest<'a> {
    let mut messages = Vec::with_capacity(request.options.history.len() + 2);
    messages.push(Message {
        role: "system",
        content: &request.system_instruction,
    });
    messages.extend(request.options.history.iter().map(|msg| Message {
        role: match msg.role {
            ChatRole::Assistant => "assistant",
            ChatRole::User => "user",
        },
        content: &msg.content,
    }));
    messages.push(Message {
        role: "user",
        content: &request.user_message,
    });

    ChatCompletionRequest {
        model,
        messages,
        temperature: request.options.temperature,
        max_tokens: request.options.max_output_tokens,
        response_format: request.structured_output().then_some(ResponseFormat {
            kind: "json_object",
        }),
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| FinerError::ai_request(None, "OpenAI response contained no text"))
}
