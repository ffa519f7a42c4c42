// crates/db/src/queries/jobs.rs
// Job store: single source of truth for job state. One worker writes,
// many pollers read.

use crate::{Database, DbError, DbResult};
use chrono::Utc;
use mealweek_core::{JobOutcome, JobPayload, JobStatus, JobType};

/// One row of the jobs table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
    pub id: String,
    pub job_type: String,
    pub status: String,
    pub payload_json: String,
    pub progress_text: Option<String>,
    pub result_json: Option<String>,
    pub error_message: Option<String>,
    pub related_plan_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    pub fn status(&self) -> Option<JobStatus> {
        JobStatus::from_db_str(&self.status)
    }

    pub fn job_type(&self) -> Option<JobType> {
        JobType::from_db_str(&self.job_type)
    }

    pub fn payload(&self) -> Result<JobPayload, serde_json::Error> {
        serde_json::from_str(&self.payload_json)
    }

    pub fn outcome(&self) -> Option<JobOutcome> {
        self.result_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
    }
}

impl Database {
    /// Create a new job in `pending` state. Returns the new job id.
    ///
    /// The payload is captured immutably at creation; the job type is
    /// derived from the payload variant.
    pub async fn create_job(
        &self,
        payload: &JobPayload,
        related_plan_id: Option<&str>,
    ) -> DbResult<String> {
        let id = uuid_string();
        let now = Utc::now().to_rfc3339();
        let payload_json =
            serde_json::to_string(payload).map_err(|e| DbError::Sqlx(sqlx::Error::Decode(e.into())))?;

        sqlx::query(
            r#"
            INSERT INTO jobs (id, job_type, status, payload_json, related_plan_id, created_at, updated_at)
            VALUES (?1, ?2, 'pending', ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(payload.job_type().as_db_str())
        .bind(&payload_json)
        .bind(related_plan_id)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(id)
    }

    /// Fetch a job by id. Read-only; repeated reads of a terminal job
    /// return identical rows.
    pub async fn get_job(&self, job_id: &str) -> DbResult<Option<JobRow>> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = ?1")
            .bind(job_id)
            .fetch_optional(self.pool())
            .await
            .map_err(DbError::Sqlx)?;
        Ok(row)
    }

    /// Move a job to `in_progress` with a new phase description.
    ///
    /// Guarded so a terminal job is never resurrected; updating a
    /// terminal or unknown job is a silent no-op (the worker that owns
    /// the job is the only writer, so this only happens after a sweep).
    pub async fn set_job_progress(&self, job_id: &str, progress_text: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE jobs SET
                status = 'in_progress',
                progress_text = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status IN ('pending', 'in_progress')
            "#,
        )
        .bind(job_id)
        .bind(progress_text)
        .bind(&now)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Terminal success: set the result and clear any error in one
    /// statement so exactly one of the two is ever present.
    pub async fn complete_job(&self, job_id: &str, outcome: &JobOutcome) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();
        let result_json = serde_json::to_string(outcome)
            .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(e.into())))?;
        sqlx::query(
            r#"
            UPDATE jobs SET
                status = 'complete',
                result_json = ?2,
                error_message = NULL,
                updated_at = ?3
            WHERE id = ?1 AND status IN ('pending', 'in_progress')
            "#,
        )
        .bind(job_id)
        .bind(&result_json)
        .bind(&now)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Terminal failure: set the error message and clear any result.
    pub async fn fail_job(&self, job_id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE jobs SET
                status = 'error',
                error_message = ?2,
                result_json = NULL,
                updated_at = ?3
            WHERE id = ?1 AND status IN ('pending', 'in_progress')
            "#,
        )
        .bind(job_id)
        .bind(error)
        .bind(&now)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Convert `in_progress` jobs whose last update is older than
    /// `ttl_secs` into terminal errors.
    ///
    /// A process crash mid-job leaves the row stuck in `in_progress`
    /// forever (the worker task died with the process); this runs at
    /// startup to surface those as errors instead. Returns the number
    /// of rows swept.
    pub async fn sweep_stale_jobs(&self, ttl_secs: i64) -> DbResult<u64> {
        let now = Utc::now();
        let cutoff = (now - chrono::Duration::seconds(ttl_secs)).to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                status = 'error',
                error_message = 'Job interrupted by server restart',
                result_json = NULL,
                updated_at = ?2
            WHERE status IN ('pending', 'in_progress') AND updated_at < ?1
            "#,
        )
        .bind(&cutoff)
        .bind(now.to_rfc3339())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    /// Count job rows of any status.
    pub async fn count_jobs(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }
}

fn uuid_string() -> String {
    uuid::Uuid::new_v4().to_string()
}
