// crates/server/src/routes/plans.rs
//! Plan endpoints: start generation, fetch, start sharing.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mealweek_core::{JobPayload, PlanSettings};
use mealweek_db::PlanWithRecipes;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::jobs::spawn_job;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(Serialize))]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub settings: PlanSettings,
    #[serde(default)]
    pub previous_recipe_titles: Vec<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct StartJobResponse {
    pub job_id: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plans/generate", post(generate_plan))
        .route("/plans/{id}", get(get_plan))
        .route("/plans/{id}/share", post(share_plan))
}

/// Start a plan-generation job. Returns 202 with the job id; progress
/// and result are read from the jobs endpoint.
async fn generate_plan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GeneratePlanRequest>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    request
        .settings
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let payload = JobPayload::PlanGeneration {
        settings: request.settings,
        previous_recipe_titles: request.previous_recipe_titles,
    };
    let job_id = state.db.create_job(&payload, None).await?;
    tracing::info!(job_id = %job_id, "Starting plan generation job");
    spawn_job(state, job_id.clone());

    Ok((StatusCode::ACCEPTED, Json(StartJobResponse { job_id })))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlanWithRecipes>> {
    let plan = state.db.get_plan_with_recipes(&id).await?;
    Ok(Json(plan))
}

/// Start a share-preparation job for an existing plan. The plan is
/// checked up front so an unknown id is a 404 and no job row is left
/// behind.
async fn share_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    if !state.db.plan_exists(&id).await? {
        return Err(ApiError::PlanNotFound(id));
    }

    let payload = JobPayload::SharePreparation {
        plan_id: id.clone(),
    };
    let job_id = state.db.create_job(&payload, Some(&id)).await?;
    tracing::info!(job_id = %job_id, plan_id = %id, "Starting share preparation job");
    spawn_job(state, job_id.clone());

    Ok((StatusCode::ACCEPTED, Json(StartJobResponse { job_id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_json, post_json, test_state_with_provider, week_recipes};

    fn valid_request() -> serde_json::Value {
        serde_json::json!({
            "settings": { "persons": 2, "caloriesPerDay": 2000 }
        })
    }

    #[tokio::test]
    async fn test_generate_returns_202_with_job_id() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let app = crate::create_app(state.clone());

        let (status, body) = post_json(app, "/api/plans/generate", valid_request()).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let job_id = body["jobId"].as_str().unwrap();
        let row = state.db.get_job(job_id).await.unwrap().unwrap();
        assert_eq!(row.job_type, "plan_generation");
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_settings() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let app = crate::create_app(state.clone());

        let request = serde_json::json!({
            "settings": { "persons": 0, "caloriesPerDay": 2000 }
        });
        let (status, body) = post_json(app, "/api/plans/generate", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad request");

        // No job row was created for the rejected request.
        assert_eq!(state.db.count_jobs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_plan() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let plan_id = state
            .db
            .save_plan("Week", "{}", &week_recipes())
            .await
            .unwrap();
        let app = crate::create_app(state);

        let (status, body) = get_json(app, &format!("/api/plans/{plan_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Week");
        assert_eq!(body["recipes"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_get_unknown_plan_404() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let app = crate::create_app(state);

        let (status, body) = get_json(app, "/api/plans/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Plan not found");
    }

    #[tokio::test]
    async fn test_share_unknown_plan_404_creates_no_job() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let app = crate::create_app(state.clone());

        let (status, body) =
            post_json(app, "/api/plans/missing/share", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Plan not found");
        assert_eq!(state.db.count_jobs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_share_existing_plan_202() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        let plan_id = state
            .db
            .save_plan("Week", "{}", &week_recipes())
            .await
            .unwrap();
        let app = crate::create_app(state.clone());

        let (status, body) = post_json(
            app,
            &format!("/api/plans/{plan_id}/share"),
            serde_json::json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let job_id = body["jobId"].as_str().unwrap();
        let row = state.db.get_job(job_id).await.unwrap().unwrap();
        assert_eq!(row.job_type, "share_preparation");
        assert_eq!(row.related_plan_id.as_deref(), Some(plan_id.as_str()));
    }
}
