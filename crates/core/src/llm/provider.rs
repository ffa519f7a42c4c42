// crates/core/src/llm/provider.rs
//! GenerationProvider trait defining the interface for LLM integrations.

use async_trait::async_trait;

use super::types::{GenerationError, GenerationRequest, GenerationResponse};

/// Trait for providers that can perform a single structured generation
/// call with a given API credential.
///
/// The credential is passed per call so that credential rotation lives
/// outside the provider (see `rotation::KeyRotationExecutor`).
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run one generation attempt with the given API key.
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Provider name for logging/display (e.g. "http", "mock").
    fn name(&self) -> &str;
}
