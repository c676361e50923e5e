//! GeminiApiProvider - direct REST client for the Gemini generateContent API.

use crate::http_error::{map_http_error, map_transport_error, parse_retry_after};
use crate::provider::AiProvider;
use crate::task::CompletionRequest;
use async_trait::async_trait;
use finer_core::document::ChatRole;
use finer_core::{FinerError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: &str = "Gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiApiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiApiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the client at another endpoint root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl AiProvider for GeminiApiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let model = request.options.model.as_deref().unwrap_or(&self.model);
        let body = build_request(request);

        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, &self.api_key)
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
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(PROVIDER, status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            FinerError::ai_request(
                None,
                format!("Failed to parse Gemini response: {}", err.without_url()),
            )
        })?;

        extract_text_response(parsed)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

fn text_content(role: &'static str, text: &str) -> Content {
    Content {
        role,
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

/// History turns map to `user`/`model`; the current message comes last.
fn build_request(request: &CompletionRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> = request
        .options
        .history
        .iter()
        .map(|msg| {
            let role = match msg.role {
                ChatRole::Assistant => "model",
                ChatRole::User => "user",
            };
            text_content(role, &msg.content)
        })
        .collect();
    contents.push(text_content("user", &request.user_message));

    GenerateContentRequest {
        system_instruction: text_content("system", &request.system_instruction),
        contents,
        generation_config: GenerationConfig {
            temperature: request.options.temperature,
            max_output_tokens: request.options.max_output_tokens,
            response_mime_type: request.structured_output().then_some("application/json"),
        },
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .ok_or_else(|| FinerError::ai_request(None, "Gemini response contained no text"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::AiTask;
    use finer_core::document::ChatMessage;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest::new(AiTask::DesignSelection, "sys", "now")
            .with_history(vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")]);
        let value = serde_json::to_value(build_request(&request)).unwrap();

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["parts"][0]["text"], "now");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_free_text_task_has_no_mime_type() {
        let request = CompletionRequest::new(AiTask::SeedChat, "sys", "now");
        let value = serde_json::to_value(build_request(&request)).unwrap();
        assert!(value["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_extract_text() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]
        }))
        .unwrap();
        assert_eq!(extract_text_response(parsed).unwrap(), "ab");

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(extract_text_response(empty).is_err());
    }

    #[test]
    fn test_endpoint_uses_model_override() {
        let provider = GeminiApiProvider::new("k").with_base_url("http://localhost:9/");
        assert_eq!(
            provider.endpoint("gemini-x"),
            "http://localhost:9/gemini-x:generateContent"
        );
    }

    #[tokio::test]
    async fn test_connect_failure_does_not_expose_key() {
        let provider =
            GeminiApiProvider::new("SECRET-KEY-123").with_base_url("http://127.0.0.1:1");
        let request = CompletionRequest::new(AiTask::SeedChat, "sys", "hello");

        let err = provider.complete(&request).await.unwrap_err();
        assert!(err.is_ai_failure());
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{err}");
    }
}
