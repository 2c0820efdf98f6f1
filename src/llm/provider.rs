use async_trait::async_trait;

use super::types::GenerateRequest;
use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "gemini")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// single-shot text completion
    async fn generate(&self, request: GenerateRequest) -> Result<String, ApiError>;
}
