// crates/server/src/routes/jobs.rs
//! Job status endpoint polled by clients.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use mealweek_core::{JobStatus, JobStatusReport};
use mealweek_db::JobRow;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/jobs/{id}", get(get_job_status))
}

/// Project a job row into the wire report. Terminal rows carry exactly
/// one of result or error; in-flight rows carry the phase text.
fn report_from_row(row: &JobRow) -> ApiResult<JobStatusReport> {
    let status = row
        .status()
        .ok_or_else(|| ApiError::Internal(format!("unknown job status '{}'", row.status)))?;

    Ok(JobStatusReport {
        status,
        progress_text: match status {
            JobStatus::Pending | JobStatus::InProgress => row.progress_text.clone(),
            _ => None,
        },
        result: if status == JobStatus::Complete {
            Some(row.outcome().ok_or_else(|| {
                ApiError::Internal(format!("completed job {} has no result", row.id))
            })?)
        } else {
            None
        },
        error: if status == JobStatus::Error {
            row.error_message.clone()
        } else {
            None
        },
    })
}

async fn get_job_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobStatusReport>> {
    let row = state
        .db
        .get_job(&id)
        .await?
        .ok_or_else(|| ApiError::JobNotFound(id.clone()))?;
    Ok(Json(report_from_row(&row)?))
}
