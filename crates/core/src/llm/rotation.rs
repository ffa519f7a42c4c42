// crates/core/src/llm/rotation.rs
//! Credential rotation with bounded per-key retry and exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::provider::GenerationProvider;
use super::types::{GenerationError, GenerationRequest, GenerationResponse};

/// Maximum attempts against a single credential before rotating.
pub const MAX_RETRIES_PER_KEY: u32 = 3;

/// Base backoff before the second attempt on a credential.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Backoff before retry `attempt` (0-indexed): `INITIAL_BACKOFF_MS * 2^attempt`.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(INITIAL_BACKOFF_MS.saturating_mul(1u64 << attempt))
}

/// Injected sleep so backoff timing is unit-testable without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One provider credential with a label for usage attribution.
#[derive(Debug, Clone)]
pub struct ApiCredential {
    /// Stable label for logs ("primary", "fallback-1", ...). Never the key.
    pub label: String,
    pub key: String,
}

impl ApiCredential {
    pub fn new(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
        }
    }
}

/// Wraps a `GenerationProvider` with multi-credential fallback.
///
/// Per credential: up to `MAX_RETRIES_PER_KEY` attempts with exponential
/// backoff between retriable failures. A non-retriable failure rotates to
/// the next credential after a single attempt. When every credential is
/// exhausted the last observed error is returned.
pub struct KeyRotationExecutor {
    provider: Arc<dyn GenerationProvider>,
    credentials: Vec<ApiCredential>,
    sleeper: Arc<dyn Sleeper>,
}

impl KeyRotationExecutor {
    pub fn new(provider: Arc<dyn GenerationProvider>, credentials: Vec<ApiCredential>) -> Self {
        Self::with_sleeper(provider, credentials, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        provider: Arc<dyn GenerationProvider>,
        credentials: Vec<ApiCredential>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            provider,
            credentials,
            sleeper,
        }
    }

    /// Execute one generation request, rotating credentials as needed.
    ///
    /// Returns the response together with the label of the credential
    /// that satisfied it, so callers can attribute usage.
    pub async fn execute(
        &self,
        request: &GenerationRequest,
    ) -> Result<(GenerationResponse, String), GenerationError> {
        if self.credentials.is_empty() {
            return Err(GenerationError::Auth { status: 401 });
        }

        let mut last_error = None;

        for credential in &self.credentials {
            for attempt in 0..MAX_RETRIES_PER_KEY {
                match self.provider.generate(&credential.key, request).await {
                    Ok(response) => {
                        tracing::debug!(
                            credential = %credential.label,
                            attempt,
                            "generation succeeded"
                        );
                        return Ok((response, credential.label.clone()));
                    }
                    Err(e) if e.is_retriable() => {
                        tracing::warn!(
                            credential = %credential.label,
                            attempt,
                            error = %e,
                            "retriable generation failure"
                        );
                        let is_last_attempt = attempt + 1 == MAX_RETRIES_PER_KEY;
                        last_error = Some(e);
                        if !is_last_attempt {
                            self.sleeper.sleep(backoff_delay(attempt)).await;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            credential = %credential.label,
                            error = %e,
                            "non-retriable failure, rotating credential"
                        );
                        last_error = Some(e);
                        break;
                    }
                }
            }
        }

        // credentials is non-empty, so at least one error was recorded
        Err(last_error.unwrap_or(GenerationError::Auth { status: 401 }))
    }
}
