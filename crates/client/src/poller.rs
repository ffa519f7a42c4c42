// crates/client/src/poller.rs
//! Resumable polling state machine for long-running jobs.
//!
//! One in-flight status request at a time; the next poll is scheduled
//! only after the previous one resolves. The job handle is persisted on
//! entry and cleared on any terminal outcome, so a restart resumes
//! polling instead of losing the job (`resume`).

use std::sync::Arc;
use std::time::{Duration, Instant};

use mealweek_core::llm::Sleeper;
use mealweek_core::{JobOutcome, JobStatus, JobType};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::handle::{ClientJobHandle, HandleStore};
use crate::status::StatusClient;

/// Polling cadence and limits for one job kind.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between successful polls.
    pub interval: Duration,
    /// Delay after a transport failure.
    pub error_interval: Duration,
    /// Total poll ceiling before giving up with a timeout.
    pub max_attempts: u32,
    /// Consecutive transport failures tolerated before a connectivity error.
    pub max_transport_errors: u32,
    /// Minimum elapsed time before a cancellation request is honored.
    pub cancel_grace: Duration,
}

impl PollConfig {
    /// Plan generation: 5s cadence, ~10 minute ceiling.
    pub fn plan_generation() -> Self {
        Self {
            interval: Duration::from_secs(5),
            error_interval: Duration::from_secs(5),
            max_attempts: 120,
            max_transport_errors: 4,
            cancel_grace: Duration::from_secs(10),
        }
    }

    /// Share preparation: 3s cadence, 5s after a transport error.
    pub fn share_preparation() -> Self {
        Self {
            interval: Duration::from_secs(3),
            error_interval: Duration::from_secs(5),
            max_attempts: 120,
            max_transport_errors: 5,
            cancel_grace: Duration::from_secs(10),
        }
    }

    pub fn for_kind(kind: JobType) -> Self {
        match kind {
            JobType::PlanGeneration => Self::plan_generation(),
            JobType::SharePreparation => Self::share_preparation(),
        }
    }
}

/// Terminal outcomes of a polling run, other than success.
#[derive(Debug, Error)]
pub enum PollError {
    /// The job itself finished in the error state.
    #[error("job failed: {0}")]
    Job(String),

    /// Too many consecutive transport failures.
    #[error("lost connection to server after {attempts} consecutive failures")]
    Connectivity { attempts: u32 },

    /// The global attempt ceiling was reached without a terminal state.
    #[error("job did not finish within {attempts} polls")]
    Timeout { attempts: u32 },

    /// Cancelled by the user. Best-effort: server-side work continues.
    #[error("cancelled")]
    Cancelled,

    /// The server broke the status contract (e.g. complete without result).
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Client-side job tracker: polls one job to completion.
pub struct JobPoller {
    client: Arc<dyn StatusClient>,
    store: Arc<dyn HandleStore>,
    sleeper: Arc<dyn Sleeper>,
    config: PollConfig,
}

impl JobPoller {
    pub fn new(
        client: Arc<dyn StatusClient>,
        store: Arc<dyn HandleStore>,
        sleeper: Arc<dyn Sleeper>,
        config: PollConfig,
    ) -> Self {
        Self {
            client,
            store,
            sleeper,
            config,
        }
    }

    /// Return the persisted handle for a kind, if a prior run left one.
    ///
    /// Called once at client startup; a `Some` result means the caller
    /// should re-enter polling with `track` instead of starting fresh.
    pub fn resume(&self, kind: JobType) -> Option<ClientJobHandle> {
        self.store.load(kind)
    }

    /// Poll the given job until it reaches a terminal state.
    ///
    /// Persists the handle on entry. On Complete the outcome is returned
    /// and the handle cleared; on job error, timeout, or cancellation the
    /// handle is also cleared. On a connectivity give-up the handle is
    /// kept so a later restart can resume the still-running job.
    ///
    /// A NotFound response is counted like a transport failure rather
    /// than failing fast: a job row can legitimately disappear mid-poll
    /// (cascade delete of its plan), and the small consecutive-error
    /// budget still surfaces a dead id within a few polls.
    pub async fn track(
        &self,
        job_id: &str,
        kind: JobType,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(&str) + Send,
    ) -> Result<JobOutcome, PollError> {
        self.store.store(&ClientJobHandle {
            job_id: job_id.to_string(),
            kind,
        });

        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut consecutive_errors: u32 = 0;

        loop {
            if cancel.is_cancelled() && started.elapsed() >= self.config.cancel_grace {
                self.store.clear(kind);
                return Err(PollError::Cancelled);
            }
            if attempts >= self.config.max_attempts {
                self.store.clear(kind);
                return Err(PollError::Timeout { attempts });
            }
            attempts += 1;

            let delay = match self.client.fetch_status(job_id).await {
                Ok(Some(report)) => match report.status {
                    JobStatus::Pending | JobStatus::InProgress => {
                        consecutive_errors = 0;
                        if let Some(text) = &report.progress_text {
                            on_progress(text);
                        }
                        self.config.interval
                    }
                    JobStatus::Complete => {
                        self.store.clear(kind);
                        return report.result.ok_or_else(|| {
                            PollError::Protocol("complete status without result".to_string())
                        });
                    }
                    JobStatus::Error => {
                        self.store.clear(kind);
                        return Err(PollError::Job(
                            report
                                .error
                                .unwrap_or_else(|| "unknown job error".to_string()),
                        ));
                    }
                },
                Ok(None) => {
                    consecutive_errors += 1;
                    tracing::warn!(job_id, consecutive_errors, "job not found while polling");
                    if consecutive_errors >= self.config.max_transport_errors {
                        return Err(PollError::Connectivity {
                            attempts: consecutive_errors,
                        });
                    }
                    self.config.error_interval
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(job_id, consecutive_errors, error = %e, "status poll failed");
                    if consecutive_errors >= self.config.max_transport_errors {
                        return Err(PollError::Connectivity {
                            attempts: consecutive_errors,
                        });
                    }
                    self.config.error_interval
                }
            };

            tokio::select! {
                _ = self.sleeper.sleep(delay) => {}
                _ = cancel.cancelled(), if started.elapsed() >= self.config.cancel_grace => {}
            }
        }
    }
}
