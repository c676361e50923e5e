//! Shared HTTP error mapping for the provider clients.

use finer_core::FinerError;
use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use std::time::Duration;

/// `{"error": {"message": ...}}`, the envelope used by both providers.
#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Maps a non-success response to `AiRequest`, preferring the provider's
/// own error message over the raw body.
pub(crate) fn map_http_error(
    provider: &str,
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> FinerError {
    let detail = serde_json::from_str::<ErrorWrapper>(&body)
        .ok()
        .and_then(|w| match (w.error.message, w.error.status) {
            (Some(message), Some(status)) => Some(format!("{} ({})", message, status)),
            (Some(message), None) => Some(message),
            (None, Some(status)) => Some(status),
            (None, None) => None,
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("{} API Error: {}", provider, status.as_u16())
            } else {
                body
            }
        });

    let message = match retry_after {
        Some(delay) => format!("{} (retry after {}s)", detail, delay.as_secs()),
        None => detail,
    };
    FinerError::ai_request(Some(status.as_u16()), message)
}

pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Maps a transport failure (connect, DNS, body read) to `AiRequest`.
///
/// The request URL is stripped from the message; it may carry credentials.
pub(crate) fn map_transport_error(provider: &str, err: reqwest::Error) -> FinerError {
    let err = err.without_url();
    FinerError::ai_request(
        err.status().map(|s| s.as_u16()),
        format!("{} API request failed: {}", provider, err),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_preferred() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        let err = map_http_error("Gemini", StatusCode::BAD_REQUEST, body.into(), None);
        assert_eq!(
            err,
            FinerError::ai_request(Some(400), "API key not valid (INVALID_ARGUMENT)")
        );
    }

    #[test]
    fn test_empty_body_uses_status() {
        let err = map_http_error("OpenAI", StatusCode::BAD_GATEWAY, String::new(), None);
        assert_eq!(err, FinerError::ai_request(Some(502), "OpenAI API Error: 502"));
    }

    #[test]
    fn test_retry_after_noted() {
        let err = map_http_error(
            "OpenAI",
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"message": "Rate limit"}}"#.into(),
            parse_retry_after(Some(&HeaderValue::from_static("20"))),
        );
        assert_eq!(
            err,
            FinerError::ai_request(Some(429), "Rate limit (retry after 20s)")
        );
    }
}
