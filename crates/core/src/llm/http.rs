// crates/core/src/llm/http.rs
//! HTTP generation provider talking to an OpenAI-compatible endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::GenerationProvider;
use super::types::{GenerationError, GenerationRequest, GenerationResponse};

const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Provider that posts `{ model, prompt, schema }` to a JSON endpoint
/// with a bearer credential and expects structured JSON back.
pub struct HttpProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    content: serde_json::Value,
    #[serde(default)]
    model: Option<String>,
}

impl HttpProvider {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[async_trait]
impl GenerationProvider for HttpProvider {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": request.prompt,
            "schema": request.schema,
            "maxTokens": request.max_tokens,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs)
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => GenerationError::RateLimited,
                401 | 403 => GenerationError::Auth { status: status.as_u16() },
                s if (500..600).contains(&s) => GenerationError::Server {
                    status: s,
                    message,
                },
                s => GenerationError::Rejected { status: s, message },
            });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseFailed(e.to_string()))?;

        Ok(GenerationResponse {
            content: wire.content,
            model: wire.model,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest::new("generate a plan", serde_json::json!({"type": "object"}))
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(bearer_token("key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": {"name": "Week"},
                "model": "planner-1"
            })))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(format!("{}/v1/generate", server.uri()), "planner-1");
        let response = provider.generate("key-1", &request()).await.unwrap();
        assert_eq!(response.content["name"], "Week");
        assert_eq!(response.model.as_deref(), Some("planner-1"));
    }

    #[tokio::test]
    async fn test_rate_limited_maps_to_retriable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(server.uri(), "planner-1");
        let err = provider.generate("k", &request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn test_server_error_retriable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(server.uri(), "planner-1");
        let err = provider.generate("k", &request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Server { status: 503, .. }));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn test_auth_error_not_retriable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(server.uri(), "planner-1");
        let err = provider.generate("bad-key", &request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Auth { status: 401 }));
        assert!(!err.is_retriable());
    }

    #[tokio::test]
    async fn test_bad_request_not_retriable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad schema"))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(server.uri(), "planner-1");
        let err = provider.generate("k", &request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(server.uri(), "planner-1");
        let err = provider.generate("k", &request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::ParseFailed(_)));
    }
}
