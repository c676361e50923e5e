//! Backend provider seam.

use crate::task::CompletionRequest;
use async_trait::async_trait;
use finer_core::Result;

/// A live model backend. Each provider owns its wire format and returns
/// plain text.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Short display name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Sends one request. Non-success statuses fail with `AiRequest`;
    /// an empty reply is an error, never `Ok("")`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
