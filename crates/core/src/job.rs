// crates/core/src/job.rs
//! Typed job model: status state machine, tagged payload/result unions.

use serde::{Deserialize, Serialize};

use crate::plan::PlanSettings;

/// Kind of asynchronous work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    PlanGeneration,
    SharePreparation,
}

impl JobType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            JobType::PlanGeneration => "plan_generation",
            JobType::SharePreparation => "share_preparation",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "plan_generation" => Some(JobType::PlanGeneration),
            "share_preparation" => Some(JobType::SharePreparation),
            _ => None,
        }
    }
}

/// Status of a job.
///
/// Transitions are monotonic: `Pending -> InProgress -> Complete | Error`.
/// A terminal row is never written again; the store enforces this with
/// status guards on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Complete,
    Error,
}

impl JobStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "in_progress" => Some(JobStatus::InProgress),
            "complete" => Some(JobStatus::Complete),
            "error" => Some(JobStatus::Error),
            _ => None,
        }
    }

    /// Complete and Error are terminal; no further transitions occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

/// Immutable input captured when a job is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobPayload {
    PlanGeneration {
        settings: PlanSettings,
        #[serde(default)]
        previous_recipe_titles: Vec<String>,
    },
    SharePreparation {
        plan_id: String,
    },
}

impl JobPayload {
    pub fn job_type(&self) -> JobType {
        match self {
            JobPayload::PlanGeneration { .. } => JobType::PlanGeneration,
            JobPayload::SharePreparation { .. } => JobType::SharePreparation,
        }
    }
}

/// Result of a completed job; shape follows the job type.
///
/// Crosses the HTTP boundary inside [`JobStatusReport`], so fields are
/// camelCase like the rest of the wire types (the variant tag stays
/// snake_case to match `JobType`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum JobOutcome {
    PlanGeneration { plan_id: String },
    SharePreparation { share_url: String },
}

/// Wire shape of the job-status endpoint, shared by server and client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
