// crates/client/src/status.rs
//! Transport for reading job status from the server.

use async_trait::async_trait;
use mealweek_core::JobStatusReport;
use thiserror::Error;

/// A failed attempt to reach the status endpoint.
#[derive(Debug, Error)]
#[error("status request failed: {0}")]
pub struct TransportError(pub String);

/// Fetches the current status of a job by id.
///
/// `Ok(None)` means the server answered 404 for the id.
#[async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch_status(&self, job_id: &str)
        -> Result<Option<JobStatusReport>, TransportError>;
}

/// HTTP status client against `GET {base_url}/api/jobs/{id}`.
pub struct HttpStatusClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatusClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn fetch_status(
        &self,
        job_id: &str,
    ) -> Result<Option<JobStatusReport>, TransportError> {
        let url = format!("{}/api/jobs/{}", self.base_url.trim_end_matches('/'), job_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(TransportError(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let report = response
            .json::<JobStatusReport>()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Some(report))
    }
}
