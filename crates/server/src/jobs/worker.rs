// crates/server/src/jobs/worker.rs
// Job worker: one spawned task per job. The worker is the only writer
// to its job row, so every job reaches exactly one terminal state.

use std::sync::Arc;

use mealweek_core::llm::GenerationError;
use mealweek_core::{
    prompt, GeneratedPlan, JobOutcome, JobPayload, PlanSettings, PlanValidationError,
};
use mealweek_db::DbError;
use thiserror::Error;

use crate::share::render_plan_html;
use crate::state::AppState;

/// Failures that terminate a job with an error message. The message is
/// what pollers see; keep it descriptive but free of internals.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Generated plan was malformed: {0}")]
    MalformedPlan(String),

    #[error("Generated plan failed validation: {0}")]
    InvalidPlan(#[from] PlanValidationError),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Storage error: {0}")]
    Db(DbError),

    #[error("Could not write share document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbError> for WorkerError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { entity: "plan", id } => WorkerError::PlanNotFound(id),
            other => WorkerError::Db(other),
        }
    }
}

/// Spawn the worker task for a freshly created job.
///
/// Fire-and-forget: the HTTP handler returns 202 while this runs. The
/// task itself settles the job row, success or failure.
pub fn spawn_job(state: Arc<AppState>, job_id: String) {
    tokio::spawn(async move {
        run_job(state, job_id).await;
    });
}

async fn run_job(state: Arc<AppState>, job_id: String) {
    let result = execute(&state, &job_id).await;
    match result {
        Ok(outcome) => {
            tracing::info!(job_id = %job_id, "Job completed");
            if let Err(e) = state.db.complete_job(&job_id, &outcome).await {
                tracing::error!(job_id = %job_id, error = %e, "Failed to record job completion");
            }
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Job failed");
            if let Err(db_err) = state.db.fail_job(&job_id, &e.to_string()).await {
                tracing::error!(job_id = %job_id, error = %db_err, "Failed to record job failure");
            }
        }
    }
}

async fn execute(state: &AppState, job_id: &str) -> Result<JobOutcome, WorkerError> {
    let row = state
        .db
        .get_job(job_id)
        .await?
        .ok_or_else(|| WorkerError::Db(DbError::NotFound {
            entity: "job",
            id: job_id.to_string(),
        }))?;
    let payload = row
        .payload()
        .map_err(|e| WorkerError::MalformedPlan(e.to_string()))?;

    match payload {
        JobPayload::PlanGeneration {
            settings,
            previous_recipe_titles,
        } => run_plan_generation(state, job_id, &settings, &previous_recipe_titles).await,
        JobPayload::SharePreparation { plan_id } => {
            run_share_preparation(state, job_id, &plan_id).await
        }
    }
}

async fn run_plan_generation(
    state: &AppState,
    job_id: &str,
    settings: &PlanSettings,
    previous_titles: &[String],
) -> Result<JobOutcome, WorkerError> {
    state.db.set_job_progress(job_id, "generating_plan").await?;

    let request = prompt::plan_request(settings, previous_titles);
    let (response, credential) = state.executor.execute(&request).await?;
    tracing::debug!(job_id = %job_id, credential = %credential, "Plan generated");

    let plan: GeneratedPlan = serde_json::from_value(response.content)
        .map_err(|e| WorkerError::MalformedPlan(e.to_string()))?;
    plan.validate()?;

    state.db.set_job_progress(job_id, "saving_plan").await?;
    let settings_json = serde_json::to_string(settings)
        .map_err(|e| WorkerError::MalformedPlan(e.to_string()))?;
    let plan_id = state
        .db
        .save_plan(&plan.name, &settings_json, &plan.recipes)
        .await?;

    Ok(JobOutcome::PlanGeneration { plan_id })
}

async fn run_share_preparation(
    state: &AppState,
    job_id: &str,
    plan_id: &str,
) -> Result<JobOutcome, WorkerError> {
    state.db.set_job_progress(job_id, "loading_plan").await?;
    let plan = state.db.get_plan_with_recipes(plan_id).await?;

    state
        .db
        .set_job_progress(job_id, "rendering_document")
        .await?;
    let share_id = uuid::Uuid::new_v4().to_string();
    let html = render_plan_html(&plan);
    tokio::fs::create_dir_all(&state.share_dir).await?;
    let path = state.share_dir.join(format!("{share_id}.html"));
    tokio::fs::write(&path, html).await?;

    state.db.set_job_progress(job_id, "publishing").await?;
    state.db.set_plan_share_id(plan_id, &share_id).await?;

    Ok(JobOutcome::SharePreparation {
        share_url: format!("/shared/{share_id}.html"),
    })
}
