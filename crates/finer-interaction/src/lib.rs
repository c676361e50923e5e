//! AI Gateway for the FINER wizard.
//!
//! Step controllers depend only on [`AiCompletion`]. The gateway decides per
//! call whether to answer from canned demo responses or a live provider.

pub mod demo;
pub mod gateway;
pub mod gemini_api_provider;
mod http_error;
pub mod openai_api_provider;
pub mod provider;
pub mod task;

pub use demo::{DemoDelay, DemoResponder};
pub use gateway::{AiCompletion, AiGateway, GatewayConfig};
pub use gemini_api_provider::GeminiApiProvider;
pub use openai_api_provider::OpenAiApiProvider;
pub use provider::AiProvider;
pub use task::{AiTask, CompletionOptions, CompletionRequest};
