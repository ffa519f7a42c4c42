// crates/core/src/llm/mod.rs
//! LLM integration: provider trait, HTTP implementation, credential rotation.

pub mod http;
pub mod provider;
pub mod rotation;
pub mod types;

pub use http::HttpProvider;
pub use provider::GenerationProvider;
pub use rotation::{
    backoff_delay, ApiCredential, KeyRotationExecutor, Sleeper, TokioSleeper,
    INITIAL_BACKOFF_MS, MAX_RETRIES_PER_KEY,
};
pub use types::{GenerationError, GenerationRequest, GenerationResponse};
